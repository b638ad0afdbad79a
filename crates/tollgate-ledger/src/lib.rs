//! Append-only usage ledger for tollgate.
//!
//! This crate defines the `UsageLedger` trait for persisting usage records
//! and the types representing quota-affecting events.
//!
//! The ledger is diagnostic: it exists for statistics and dispute resolution.
//! The subscription counter is the source of truth for current usage; the
//! ledger must never be replayed to reconstruct it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use tollgate_types::{OrganizationId, ResourceKind, SubscriptionId};

/// Unique identifier for a usage record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageRecordId(pub Uuid);

impl UsageRecordId {
    /// Generate a new record ID using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for UsageRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UsageRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UsageRecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What happened to the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    /// A unit was reserved (resource created).
    Created,
    /// A unit was released (resource deleted).
    Deleted,
    /// An out-of-band correction, e.g. a period reset.
    Adjusted,
}

impl std::fmt::Display for UsageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UsageAction::Created => "created",
            UsageAction::Deleted => "deleted",
            UsageAction::Adjusted => "adjusted",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for UsageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(UsageAction::Created),
            "deleted" => Ok(UsageAction::Deleted),
            "adjusted" => Ok(UsageAction::Adjusted),
            _ => Err(format!("Unknown usage action: {}", s)),
        }
    }
}

/// An immutable audit entry for one quota mutation.
///
/// Records are append-only: never updated, never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique identifier for this entry
    pub id: UsageRecordId,
    /// When the mutation occurred
    pub timestamp: DateTime<Utc>,
    /// Subscription whose counter moved
    pub subscription_id: SubscriptionId,
    /// Organization owning the subscription
    pub organization_id: OrganizationId,
    /// Resource counter affected
    pub resource: ResourceKind,
    /// What happened
    pub action: UsageAction,
    /// Signed quantity (positive for reservations, negative for releases)
    pub quantity: i64,
    /// Additional context as JSON (e.g. the triggering entity ID)
    pub metadata: Option<serde_json::Value>,
}

impl UsageRecord {
    /// Create a new usage record builder.
    pub fn builder(
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        resource: ResourceKind,
        action: UsageAction,
    ) -> UsageRecordBuilder {
        UsageRecordBuilder::new(subscription_id, organization_id, resource, action)
    }
}

/// Builder for constructing usage records.
pub struct UsageRecordBuilder {
    subscription_id: SubscriptionId,
    organization_id: OrganizationId,
    resource: ResourceKind,
    action: UsageAction,
    quantity: i64,
    metadata: Option<serde_json::Value>,
}

impl UsageRecordBuilder {
    pub fn new(
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        resource: ResourceKind,
        action: UsageAction,
    ) -> Self {
        let quantity = match action {
            UsageAction::Created => 1,
            UsageAction::Deleted => -1,
            UsageAction::Adjusted => 0,
        };
        Self {
            subscription_id,
            organization_id,
            resource,
            action,
            quantity,
            metadata: None,
        }
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> UsageRecord {
        UsageRecord {
            id: UsageRecordId::new(),
            timestamp: Utc::now(),
            subscription_id: self.subscription_id,
            organization_id: self.organization_id,
            resource: self.resource,
            action: self.action,
            quantity: self.quantity,
            metadata: self.metadata,
        }
    }
}

/// Filter for querying usage records.
#[derive(Clone, Debug, Default)]
pub struct UsageFilter {
    /// Filter by organization
    pub organization_id: Option<OrganizationId>,
    /// Filter by resource kind
    pub resource: Option<ResourceKind>,
    /// Filter by action
    pub action: Option<UsageAction>,
    /// Filter by start timestamp (inclusive)
    pub from: Option<DateTime<Utc>>,
    /// Filter by end timestamp (exclusive)
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of results to return
    pub limit: Option<u32>,
    /// Number of results to skip (for pagination)
    pub offset: Option<u32>,
}

impl UsageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organization_id(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn resource(mut self, resource: ResourceKind) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn action(mut self, action: UsageAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Error type for ledger operations.
#[derive(Debug, Error)]
pub enum UsageLedgerError {
    #[error("database error: {0}")]
    Database(String),

    #[error("usage record not found: {0}")]
    NotFound(UsageRecordId),
}

/// Trait for usage ledger persistence.
///
/// Implementations store records and provide query capabilities for
/// statistics and dispute resolution. The ledger is never consulted to
/// compute current counters.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Append a usage record.
    async fn record(&self, record: UsageRecord) -> Result<(), UsageLedgerError>;

    /// Query records with optional filters, ordered by timestamp descending.
    async fn query(&self, filter: UsageFilter) -> Result<Vec<UsageRecord>, UsageLedgerError>;

    /// Count records matching the filter criteria.
    async fn count(&self, filter: UsageFilter) -> Result<u64, UsageLedgerError>;
}
