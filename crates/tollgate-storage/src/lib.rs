//! Storage abstraction for tollgate.
//!
//! Backend crates (e.g. tollgate-store-memory) implement the [`Store`] trait
//! so the engine doesn't depend on any specific database engine or schema
//! details.
//!
//! Quota mutation primitives live on this trait because the counter update
//! and the matching usage-ledger append must be atomically consistent.
//! Backends wrap both in one transaction (or one critical section) rather
//! than leaving the engine to compose two racy calls.

use chrono::{DateTime, Utc};
use thiserror::Error;

use tollgate_types::{
    CapabilityOverride, Membership, MembershipStatus, OrganizationId, OrganizationRole,
    ReserveOutcome, ResourceKind, Subscription, SubscriptionId, SubscriptionStatus, Tier, UserId,
};

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Parameters for adding a member to an organization.
#[derive(Clone, Debug)]
pub struct AddMemberParams {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: OrganizationRole,
    pub status: MembershipStatus,
    pub invited_by: Option<UserId>,
}

/// Parameters for creating a subscription.
#[derive(Clone, Debug)]
pub struct CreateSubscriptionParams {
    pub organization_id: OrganizationId,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
}

/// The storage trait the engine depends on.
///
/// All quota methods are scoped by organization; `reserve_quota` must be a
/// single atomic conditional increment with respect to concurrent calls for
/// the same (organization, resource kind) pair.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────── Memberships ─────────────────────────────────

    /// Add a user to an organization with a role.
    async fn add_member(&self, params: &AddMemberParams) -> Result<(), StoreError>;

    /// Get a user's membership in an organization.
    async fn get_membership(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Membership, StoreError>;

    /// Update a membership's lifecycle status.
    async fn set_membership_status(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        status: MembershipStatus,
    ) -> Result<(), StoreError>;

    /// Update a member's role.
    async fn set_membership_role(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        role: OrganizationRole,
    ) -> Result<(), StoreError>;

    /// Replace a membership's override list.
    async fn set_membership_overrides(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        overrides: &[CapabilityOverride],
    ) -> Result<(), StoreError>;

    /// Count members in an organization.
    async fn count_members(&self, org_id: &OrganizationId) -> Result<i32, StoreError>;

    // ──────────────────────────────── Subscriptions ────────────────────────────────

    /// Create a subscription for an organization (returns generated ID).
    ///
    /// Counters for every resource kind start at zero.
    async fn create_subscription(
        &self,
        params: &CreateSubscriptionParams,
    ) -> Result<SubscriptionId, StoreError>;

    /// Get the subscription for an organization.
    async fn get_subscription(&self, org_id: &OrganizationId)
        -> Result<Subscription, StoreError>;

    /// Update subscription status (driven by external billing events).
    async fn set_subscription_status(
        &self,
        org_id: &OrganizationId,
        status: SubscriptionStatus,
    ) -> Result<(), StoreError>;

    /// Update subscription tier (upgrade/downgrade).
    async fn set_subscription_tier(
        &self,
        org_id: &OrganizationId,
        tier: Tier,
    ) -> Result<(), StoreError>;

    // ──────────────────────────────── Quota counters ────────────────────────────────

    /// Read the current value of one resource counter.
    async fn read_counter(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
    ) -> Result<i64, StoreError>;

    /// Atomically increment the counter if `current < limit` (or the limit is
    /// unlimited), appending the matching `created` usage record in the same
    /// transaction. Returns `Exceeded` with the observed counter, mutating
    /// nothing, when no headroom remains.
    async fn reserve_quota(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
        limit: i64,
    ) -> Result<ReserveOutcome, StoreError>;

    /// Atomically decrement the counter by `quantity`, clamped at zero,
    /// appending the matching `deleted` usage record. Returns the new
    /// counter value. `quantity` must be positive; zero or negative
    /// quantities are rejected with `Conflict` so a release can never
    /// inflate the counter.
    async fn release_quota(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
        quantity: i64,
    ) -> Result<i64, StoreError>;

    /// Zero the named counters (period rollover), appending `adjusted`
    /// usage records for each counter that changed.
    async fn reset_counters(
        &self,
        org_id: &OrganizationId,
        kinds: &[ResourceKind],
    ) -> Result<(), StoreError>;
}
