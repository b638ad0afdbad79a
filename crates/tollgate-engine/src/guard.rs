//! Single entry point for access checks.
//!
//! `authorize` answers "may this user do this right now?": permission
//! resolution first, then an advisory quota check. It never reserves:
//! callers that go on to create a resource call `commit_reservation` after
//! the write is known to succeed, so a failed write never leaks quota. The
//! reservation itself is the atomic arbiter under concurrency; `authorize`
//! only filters out requests that are already hopeless.

use std::path::Path;
use std::sync::Arc;

use tollgate_storage::Store;
use tollgate_types::{Capability, OrganizationId, ReserveOutcome, ResourceKind, UserId};

use crate::config::EngineConfig;
use crate::decision::{Decision, DenyReason, Resolution};
use crate::error::EngineError;
use crate::permissions::PermissionEngine;
use crate::quota::QuotaLedger;

/// Façade combining permission resolution and quota enforcement.
pub struct Guard<S: Store> {
    permissions: PermissionEngine<S>,
    quota: QuotaLedger<S>,
}

impl<S: Store> Guard<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            permissions: PermissionEngine::new(Arc::clone(&store), config),
            quota: QuotaLedger::new(store),
        }
    }

    /// Build a guard from a JSON config file instead of an in-memory
    /// [`EngineConfig`].
    pub fn from_config_file(store: Arc<S>, path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let config = EngineConfig::load_from(path)?;
        Ok(Self::new(store, config))
    }

    pub fn permissions(&self) -> &PermissionEngine<S> {
        &self.permissions
    }

    pub fn quota(&self) -> &QuotaLedger<S> {
        &self.quota
    }

    /// Full access check: capability, and (when the action consumes a
    /// resource) quota headroom. Check only; nothing is claimed.
    pub async fn authorize(
        &self,
        user_id: &UserId,
        org_id: &OrganizationId,
        capability: Capability,
        consumes: Option<ResourceKind>,
    ) -> Result<Decision, EngineError> {
        let caps = match self.permissions.resolve(user_id, org_id).await? {
            Resolution::Granted(caps) => caps,
            Resolution::Denied(reason) => return Ok(Decision::denied(reason)),
        };

        if !caps.contains(&capability) {
            return Ok(Decision::denied(DenyReason::PermissionDenied));
        }

        if let Some(kind) = consumes {
            let status = self.quota.check_quota(org_id, kind).await?;
            if !status.allowed {
                return Ok(Decision::denied(DenyReason::QuotaExceeded {
                    resource: kind,
                    limit: status.limit,
                    current: status.current,
                }));
            }
        }

        Ok(Decision::Allowed)
    }

    /// Claim the quota unit after the underlying write succeeded.
    pub async fn commit_reservation(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
    ) -> Result<ReserveOutcome, EngineError> {
        self.quota.reserve(org_id, kind).await
    }

    /// Return quota units after a resource deletion.
    pub async fn release_reservation(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
        quantity: i64,
    ) -> Result<i64, EngineError> {
        self.quota.release(org_id, kind, quantity).await
    }
}
