//! Quota enforcement operations.
//!
//! Limits are derived from the organization's subscription tier on every
//! call; the subscription counter is the source of truth for current usage.
//! `check_quota` is advisory (the answer can be stale by the time a write
//! lands); only `reserve` actually claims a slot, atomically, via the
//! store's conditional-increment primitive.

use std::collections::BTreeMap;
use std::sync::Arc;

use tollgate_storage::Store;
use tollgate_types::{OrganizationId, QuotaCounter, ReserveOutcome, ResourceKind};

use crate::decision::{QuotaStatus, ResourceUsage};
use crate::error::EngineError;

/// Quota counter operations for one storage backend.
pub struct QuotaLedger<S: Store> {
    store: Arc<S>,
}

impl<S: Store> QuotaLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn counter(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
    ) -> Result<QuotaCounter, EngineError> {
        let subscription = self.store.get_subscription(org_id).await?;
        let limit = subscription.tier.quota_limit(kind);
        let current = self.store.read_counter(org_id, kind).await?;
        Ok(QuotaCounter::new(current, limit))
    }

    /// Advisory check: would one more unit fit right now?
    pub async fn check_quota(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
    ) -> Result<QuotaStatus, EngineError> {
        Ok(QuotaStatus::from_counter(self.counter(org_id, kind).await?))
    }

    /// Claim one unit. Atomic with respect to concurrent reserves for the
    /// same (organization, resource) pair; `Exceeded` mutates nothing.
    pub async fn reserve(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
    ) -> Result<ReserveOutcome, EngineError> {
        let subscription = self.store.get_subscription(org_id).await?;
        let limit = subscription.tier.quota_limit(kind);
        let outcome = self.store.reserve_quota(org_id, kind, limit).await?;
        Ok(outcome)
    }

    /// Return units, e.g. after a resource deletion. Clamped at zero;
    /// `quantity` must be positive.
    pub async fn release(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
        quantity: i64,
    ) -> Result<i64, EngineError> {
        let new_current = self.store.release_quota(org_id, kind, quantity).await?;
        Ok(new_current)
    }

    /// Read-only usage snapshot across every resource kind.
    pub async fn stats(
        &self,
        org_id: &OrganizationId,
    ) -> Result<BTreeMap<ResourceKind, ResourceUsage>, EngineError> {
        let subscription = self.store.get_subscription(org_id).await?;
        let mut usage = BTreeMap::new();
        for kind in ResourceKind::all() {
            let limit = subscription.tier.quota_limit(*kind);
            let current = self.store.read_counter(org_id, *kind).await?;
            usage.insert(
                *kind,
                ResourceUsage::from_counter(QuotaCounter::new(current, limit)),
            );
        }
        Ok(usage)
    }

    /// Billing-period rollover: zero the periodic counters. Durable counters
    /// (seats, integrations, automation rules) are live counts and stay put.
    pub async fn reset_period(&self, org_id: &OrganizationId) -> Result<(), EngineError> {
        let periodic: Vec<ResourceKind> = ResourceKind::periodic().collect();
        self.store.reset_counters(org_id, &periodic).await?;
        tracing::info!(org_id = %org_id, "periodic quota counters reset");
        Ok(())
    }
}
