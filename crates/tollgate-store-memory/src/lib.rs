//! In-memory storage backend for tollgate.
//!
//! This implementation is suitable for:
//! - Single server deployments
//! - Development and testing
//!
//! Each organization's state lives behind its own mutex, so quota
//! reservations for one organization serialize while different organizations
//! proceed independently. The counter mutation and the usage-ledger append
//! happen under the same guard, keeping them atomically consistent. The lock
//! is a `std::sync::Mutex` and is never held across an await.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use tollgate_ledger::{UsageAction, UsageFilter, UsageLedger, UsageLedgerError, UsageRecord};
use tollgate_storage::{AddMemberParams, CreateSubscriptionParams, Store, StoreError};
use tollgate_types::{
    CapabilityOverride, Membership, MembershipStatus, OrganizationId, OrganizationRole,
    QuotaCounter, ReserveOutcome, ResourceKind, Subscription, SubscriptionId, SubscriptionStatus,
    Tier, UserId,
};

#[derive(Default)]
struct OrgState {
    subscription: Option<Subscription>,
    members: HashMap<UserId, Membership>,
    counters: BTreeMap<ResourceKind, i64>,
}

/// In-memory store implementing both [`Store`] and [`UsageLedger`].
///
/// State is only visible within a single process.
pub struct MemoryStore {
    // Lock order: org entry first, then the record log.
    orgs: DashMap<OrganizationId, Mutex<OrgState>>,
    records: Mutex<Vec<UsageRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            orgs: DashMap::new(),
            records: Mutex::new(Vec::new()),
        }
    }

    // Looks up existing state only; creating the entry is reserved for
    // add_member and create_subscription so reads never grow the map.
    fn with_org<T>(
        &self,
        org_id: &OrganizationId,
        f: impl FnOnce(&mut OrgState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let entry = self.orgs.get(org_id).ok_or(StoreError::NotFound)?;
        let mut state = entry.lock().map_err(|_| {
            StoreError::Backend("organization state lock poisoned".to_string())
        })?;
        f(&mut state)
    }

    fn with_org_or_insert<T>(
        &self,
        org_id: &OrganizationId,
        f: impl FnOnce(&mut OrgState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let entry = self.orgs.entry(*org_id).or_default();
        let mut state = entry.lock().map_err(|_| {
            StoreError::Backend("organization state lock poisoned".to_string())
        })?;
        f(&mut state)
    }

    fn append_record(&self, record: UsageRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Backend("record log lock poisoned".to_string()))?;
        records.push(record);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn add_member(&self, params: &AddMemberParams) -> Result<(), StoreError> {
        self.with_org_or_insert(&params.organization_id, |state| {
            if state.members.contains_key(&params.user_id) {
                return Err(StoreError::AlreadyExists);
            }
            state.members.insert(
                params.user_id,
                Membership {
                    organization_id: params.organization_id,
                    user_id: params.user_id,
                    role: params.role,
                    status: params.status,
                    overrides: Vec::new(),
                    invited_by: params.invited_by,
                    joined_at: Utc::now(),
                },
            );
            Ok(())
        })
    }

    async fn get_membership(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Membership, StoreError> {
        self.with_org(org_id, |state| {
            state.members.get(user_id).cloned().ok_or(StoreError::NotFound)
        })
    }

    async fn set_membership_status(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        status: MembershipStatus,
    ) -> Result<(), StoreError> {
        self.with_org(org_id, |state| {
            let member = state.members.get_mut(user_id).ok_or(StoreError::NotFound)?;
            member.status = status;
            Ok(())
        })
    }

    async fn set_membership_role(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        role: OrganizationRole,
    ) -> Result<(), StoreError> {
        self.with_org(org_id, |state| {
            let member = state.members.get_mut(user_id).ok_or(StoreError::NotFound)?;
            member.role = role;
            Ok(())
        })
    }

    async fn set_membership_overrides(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        overrides: &[CapabilityOverride],
    ) -> Result<(), StoreError> {
        self.with_org(org_id, |state| {
            let member = state.members.get_mut(user_id).ok_or(StoreError::NotFound)?;
            member.overrides = overrides.to_vec();
            Ok(())
        })
    }

    async fn count_members(&self, org_id: &OrganizationId) -> Result<i32, StoreError> {
        match self.orgs.get(org_id) {
            Some(entry) => {
                let state = entry.lock().map_err(|_| {
                    StoreError::Backend("organization state lock poisoned".to_string())
                })?;
                Ok(state.members.len() as i32)
            }
            None => Ok(0),
        }
    }

    async fn create_subscription(
        &self,
        params: &CreateSubscriptionParams,
    ) -> Result<SubscriptionId, StoreError> {
        self.with_org_or_insert(&params.organization_id, |state| {
            if state.subscription.is_some() {
                return Err(StoreError::AlreadyExists);
            }
            let id = SubscriptionId(uuid::Uuid::now_v7());
            let now = Utc::now();
            state.subscription = Some(Subscription {
                id,
                organization_id: params.organization_id,
                tier: params.tier,
                status: params.status,
                current_period_start: params.current_period_start,
                current_period_end: params.current_period_end,
                created_at: now,
                updated_at: now,
            });
            for kind in ResourceKind::all() {
                state.counters.insert(*kind, 0);
            }
            Ok(id)
        })
    }

    async fn get_subscription(
        &self,
        org_id: &OrganizationId,
    ) -> Result<Subscription, StoreError> {
        self.with_org(org_id, |state| {
            state.subscription.clone().ok_or(StoreError::NotFound)
        })
    }

    async fn set_subscription_status(
        &self,
        org_id: &OrganizationId,
        status: SubscriptionStatus,
    ) -> Result<(), StoreError> {
        self.with_org(org_id, |state| {
            let sub = state.subscription.as_mut().ok_or(StoreError::NotFound)?;
            sub.status = status;
            sub.updated_at = Utc::now();
            Ok(())
        })
    }

    async fn set_subscription_tier(
        &self,
        org_id: &OrganizationId,
        tier: Tier,
    ) -> Result<(), StoreError> {
        self.with_org(org_id, |state| {
            let sub = state.subscription.as_mut().ok_or(StoreError::NotFound)?;
            sub.tier = tier;
            sub.updated_at = Utc::now();
            Ok(())
        })
    }

    async fn read_counter(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
    ) -> Result<i64, StoreError> {
        self.with_org(org_id, |state| {
            if state.subscription.is_none() {
                return Err(StoreError::NotFound);
            }
            Ok(state.counters.get(&kind).copied().unwrap_or(0))
        })
    }

    async fn reserve_quota(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
        limit: i64,
    ) -> Result<ReserveOutcome, StoreError> {
        let entry = self.orgs.get(org_id).ok_or(StoreError::NotFound)?;
        let mut state = entry.lock().map_err(|_| {
            StoreError::Backend("organization state lock poisoned".to_string())
        })?;

        let sub_id = state
            .subscription
            .as_ref()
            .map(|s| s.id)
            .ok_or(StoreError::NotFound)?;

        let current = state.counters.get(&kind).copied().unwrap_or(0);
        let counter = QuotaCounter::new(current, limit);
        if !counter.has_headroom() {
            return Ok(ReserveOutcome::Exceeded(counter));
        }

        state.counters.insert(kind, current + 1);

        // Same critical section as the increment: both land or neither does.
        let record = UsageRecord::builder(sub_id, *org_id, kind, UsageAction::Created).build();
        self.append_record(record)?;

        Ok(ReserveOutcome::Reserved(QuotaCounter::new(current + 1, limit)))
    }

    async fn release_quota(
        &self,
        org_id: &OrganizationId,
        kind: ResourceKind,
        quantity: i64,
    ) -> Result<i64, StoreError> {
        if quantity <= 0 {
            return Err(StoreError::Conflict);
        }

        let entry = self.orgs.get(org_id).ok_or(StoreError::NotFound)?;
        let mut state = entry.lock().map_err(|_| {
            StoreError::Backend("organization state lock poisoned".to_string())
        })?;

        let sub_id = state
            .subscription
            .as_ref()
            .map(|s| s.id)
            .ok_or(StoreError::NotFound)?;

        let current = state.counters.get(&kind).copied().unwrap_or(0);
        let next = (current - quantity).max(0);
        if current - quantity < 0 {
            // Release without a matching reserve upstream; clamp, don't crash.
            tracing::warn!(
                org_id = %org_id,
                resource = %kind,
                current,
                quantity,
                "quota release clamped at zero"
            );
        }
        state.counters.insert(kind, next);

        let released = current - next;
        if released > 0 {
            let record = UsageRecord::builder(sub_id, *org_id, kind, UsageAction::Deleted)
                .quantity(-released)
                .build();
            self.append_record(record)?;
        }

        Ok(next)
    }

    async fn reset_counters(
        &self,
        org_id: &OrganizationId,
        kinds: &[ResourceKind],
    ) -> Result<(), StoreError> {
        let entry = self.orgs.get(org_id).ok_or(StoreError::NotFound)?;
        let mut state = entry.lock().map_err(|_| {
            StoreError::Backend("organization state lock poisoned".to_string())
        })?;

        let sub_id = state
            .subscription
            .as_ref()
            .map(|s| s.id)
            .ok_or(StoreError::NotFound)?;

        for kind in kinds {
            let current = state.counters.get(kind).copied().unwrap_or(0);
            if current == 0 {
                continue;
            }
            state.counters.insert(*kind, 0);
            let record = UsageRecord::builder(sub_id, *org_id, *kind, UsageAction::Adjusted)
                .quantity(-current)
                .build();
            self.append_record(record)?;
        }
        Ok(())
    }
}

#[async_trait]
impl UsageLedger for MemoryStore {
    async fn record(&self, record: UsageRecord) -> Result<(), UsageLedgerError> {
        self.append_record(record)
            .map_err(|e| UsageLedgerError::Database(e.to_string()))
    }

    async fn query(&self, filter: UsageFilter) -> Result<Vec<UsageRecord>, UsageLedgerError> {
        let records = self
            .records
            .lock()
            .map_err(|_| UsageLedgerError::Database("record log lock poisoned".to_string()))?;

        let mut matched: Vec<UsageRecord> = records
            .iter()
            .filter(|r| matches_filter(r, &filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let offset = filter.offset.unwrap_or(0) as usize;
        let matched: Vec<UsageRecord> = match filter.limit {
            Some(limit) => matched.into_iter().skip(offset).take(limit as usize).collect(),
            None => matched.into_iter().skip(offset).collect(),
        };
        Ok(matched)
    }

    async fn count(&self, filter: UsageFilter) -> Result<u64, UsageLedgerError> {
        let records = self
            .records
            .lock()
            .map_err(|_| UsageLedgerError::Database("record log lock poisoned".to_string()))?;
        Ok(records.iter().filter(|r| matches_filter(r, &filter)).count() as u64)
    }
}

fn matches_filter(record: &UsageRecord, filter: &UsageFilter) -> bool {
    if let Some(org_id) = filter.organization_id {
        if record.organization_id != org_id {
            return false;
        }
    }
    if let Some(resource) = filter.resource {
        if record.resource != resource {
            return false;
        }
    }
    if let Some(action) = filter.action {
        if record.action != action {
            return false;
        }
    }
    if let Some(from) = filter.from {
        if record.timestamp < from {
            return false;
        }
    }
    if let Some(to) = filter.to {
        if record.timestamp >= to {
            return false;
        }
    }
    true
}
