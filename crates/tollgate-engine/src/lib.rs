//! Entitlement and usage-quota engine.
//!
//! Answers two questions for a multi-tenant SaaS backend:
//!
//! 1. **May this user perform this action in this organization?**
//!    [`PermissionEngine`] resolves the plan tier, the organizational role,
//!    and any per-member overrides into an effective capability set.
//! 2. **Does the organization have quota left for this resource?**
//!    [`QuotaLedger`] enforces plan-derived counters with atomic
//!    reservations and an append-only usage ledger behind them.
//!
//! [`Guard`] is the combined entry point request handlers call. The intended
//! write path is check (`authorize`), then perform the write, then claim the
//! unit (`commit_reservation`), so a failed write never consumes quota.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tollgate_engine::{EngineConfig, Guard};
//! use tollgate_store_memory::MemoryStore;
//! use tollgate_types::{Capability, OrganizationId, ResourceKind, UserId};
//!
//! # async fn example(user_id: UserId, org_id: OrganizationId) -> Result<(), tollgate_engine::EngineError> {
//! let store = Arc::new(MemoryStore::new());
//! let guard = Guard::new(store, EngineConfig::default());
//!
//! let decision = guard
//!     .authorize(&user_id, &org_id, Capability::RecordsWrite, Some(ResourceKind::Records))
//!     .await?;
//! if decision.is_allowed() {
//!     // ... perform the write, then:
//!     guard.commit_reservation(&org_id, ResourceKind::Records).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod guard;
pub mod permissions;
pub mod quota;

pub use config::{ConfigError, EngineConfig};
pub use decision::{Decision, DenyReason, QuotaStatus, Resolution, ResourceUsage};
pub use error::EngineError;
pub use guard::Guard;
pub use permissions::PermissionEngine;
pub use quota::QuotaLedger;
