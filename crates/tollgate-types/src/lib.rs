//! Shared schema for the tollgate entitlement engine.
//!
//! Every other crate in the workspace imports its enumerations from here so
//! the capability catalog, plan tiers, roles, and resource kinds have exactly
//! one definition. Changing the catalog is a single edit in this crate.

mod capability;
mod ids;
mod memberships;
mod quota;
mod roles;
mod subscriptions;
mod tiers;

pub use capability::{
    Capability, CapabilityGroup, CapabilityOverride, OverrideEffect, ParseCapabilityError,
};
pub use ids::{OrganizationId, SubscriptionId, UserId};
pub use memberships::{Membership, MembershipStatus};
pub use quota::{QuotaCounter, ReserveOutcome, ResourceKind};
pub use roles::{OrganizationRole, ParseOrganizationRoleError};
pub use subscriptions::{Subscription, SubscriptionStatus};
pub use tiers::Tier;
