//! Consumable resource kinds and quota counters.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A consumable resource type with a per-subscription counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Records,
    CampaignAssets,
    AutomationRules,
    Integrations,
    UserSeats,
}

impl ResourceKind {
    /// All resource kinds.
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Records,
            ResourceKind::CampaignAssets,
            ResourceKind::AutomationRules,
            ResourceKind::Integrations,
            ResourceKind::UserSeats,
        ]
    }

    /// Whether the counter resets to zero at the start of each billing period.
    ///
    /// Durable kinds (automation rules, integrations, seats) are live counts
    /// and survive period rollover.
    pub fn is_periodic(&self) -> bool {
        match self {
            ResourceKind::Records | ResourceKind::CampaignAssets => true,
            ResourceKind::AutomationRules
            | ResourceKind::Integrations
            | ResourceKind::UserSeats => false,
        }
    }

    /// The periodic kinds, for period-rollover resets.
    pub fn periodic() -> impl Iterator<Item = ResourceKind> {
        Self::all().iter().copied().filter(ResourceKind::is_periodic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Records => "records",
            ResourceKind::CampaignAssets => "campaign_assets",
            ResourceKind::AutomationRules => "automation_rules",
            ResourceKind::Integrations => "integrations",
            ResourceKind::UserSeats => "user_seats",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "records" => Ok(ResourceKind::Records),
            "campaign_assets" => Ok(ResourceKind::CampaignAssets),
            "automation_rules" => Ok(ResourceKind::AutomationRules),
            "integrations" => Ok(ResourceKind::Integrations),
            "user_seats" => Ok(ResourceKind::UserSeats),
            _ => Err(format!("invalid resource kind: {}", s)),
        }
    }
}

/// Point-in-time view of one resource counter against its plan limit.
///
/// `limit == UNLIMITED` (-1) means no cap. `remaining()` uses the same -1
/// sentinel for unlimited; it is never negative otherwise. The counter is the
/// source of truth for current usage; the usage ledger is audit-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaCounter {
    pub current: i64,
    pub limit: i64,
}

impl QuotaCounter {
    /// Sentinel limit value meaning "no limit".
    pub const UNLIMITED: i64 = -1;

    pub fn new(current: i64, limit: i64) -> Self {
        Self { current, limit }
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == Self::UNLIMITED
    }

    /// Slots left before the limit. `-1` when unlimited, clamped at zero.
    pub fn remaining(&self) -> i64 {
        if self.is_unlimited() {
            Self::UNLIMITED
        } else {
            (self.limit - self.current).max(0)
        }
    }

    /// Whether one more unit can be reserved.
    pub fn has_headroom(&self) -> bool {
        self.is_unlimited() || self.current < self.limit
    }
}

/// Result of an atomic quota reservation attempt.
///
/// `Exceeded` carries the counter as observed; nothing was mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved(QuotaCounter),
    Exceeded(QuotaCounter),
}

impl ReserveOutcome {
    pub fn is_reserved(&self) -> bool {
        matches!(self, ReserveOutcome::Reserved(_))
    }

    pub fn counter(&self) -> QuotaCounter {
        match self {
            ReserveOutcome::Reserved(c) | ReserveOutcome::Exceeded(c) => *c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_roundtrip() {
        for kind in ResourceKind::all() {
            let s = kind.as_str();
            let parsed: ResourceKind = s.parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_resource_kind_parse_invalid() {
        assert!("widgets".parse::<ResourceKind>().is_err());
        assert!("Records".parse::<ResourceKind>().is_err()); // Case sensitive
    }

    #[test]
    fn test_periodic_split() {
        assert!(ResourceKind::Records.is_periodic());
        assert!(ResourceKind::CampaignAssets.is_periodic());
        assert!(!ResourceKind::UserSeats.is_periodic());
        assert!(!ResourceKind::Integrations.is_periodic());
        assert!(!ResourceKind::AutomationRules.is_periodic());
    }

    #[test]
    fn test_periodic_iterator_matches_predicate() {
        let periodic: Vec<_> = ResourceKind::periodic().collect();
        assert_eq!(
            periodic,
            vec![ResourceKind::Records, ResourceKind::CampaignAssets]
        );
    }

    #[test]
    fn test_counter_headroom() {
        assert!(QuotaCounter::new(0, 10).has_headroom());
        assert!(QuotaCounter::new(9, 10).has_headroom());
        assert!(!QuotaCounter::new(10, 10).has_headroom());
        assert!(!QuotaCounter::new(11, 10).has_headroom());
    }

    #[test]
    fn test_counter_remaining() {
        assert_eq!(QuotaCounter::new(3, 10).remaining(), 7);
        assert_eq!(QuotaCounter::new(10, 10).remaining(), 0);
        // Over-limit counters (possible after a downgrade) clamp at zero.
        assert_eq!(QuotaCounter::new(15, 10).remaining(), 0);
    }

    #[test]
    fn test_unlimited_counter() {
        let counter = QuotaCounter::new(500_000, QuotaCounter::UNLIMITED);
        assert!(counter.is_unlimited());
        assert!(counter.has_headroom());
        assert_eq!(counter.remaining(), QuotaCounter::UNLIMITED);
    }

    #[test]
    fn test_reserve_outcome_accessors() {
        let c = QuotaCounter::new(5, 10);
        assert!(ReserveOutcome::Reserved(c).is_reserved());
        assert!(!ReserveOutcome::Exceeded(c).is_reserved());
        assert_eq!(ReserveOutcome::Exceeded(c).counter(), c);
    }
}
