//! Typed access decisions.

use std::collections::HashSet;

use tollgate_types::{Capability, QuotaCounter, ResourceKind};

/// Why access was denied.
///
/// `PermissionDenied` and `QuotaExceeded` are definitive for the current
/// state: retrying without an external change (override granted, plan
/// upgraded, usage released) yields the same answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// The user is not a member of the organization.
    NoMembership,
    /// The membership exists but is suspended or still a pending invite.
    MembershipInactive,
    /// The organization has no subscription.
    NoSubscription,
    /// The subscription is not in a usable status.
    SubscriptionInactive,
    /// The effective capability set does not contain the capability.
    PermissionDenied,
    /// The resource counter has no headroom left.
    QuotaExceeded {
        resource: ResourceKind,
        limit: i64,
        current: i64,
    },
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::NoMembership => write!(f, "user is not a member of the organization"),
            DenyReason::MembershipInactive => write!(f, "membership is not active"),
            DenyReason::NoSubscription => write!(f, "organization has no subscription"),
            DenyReason::SubscriptionInactive => write!(f, "subscription is not active"),
            DenyReason::PermissionDenied => write!(f, "capability not granted"),
            DenyReason::QuotaExceeded {
                resource,
                limit,
                current,
            } => write!(f, "quota exceeded for {}: {}/{}", resource, current, limit),
        }
    }
}

/// Outcome of full permission resolution for a (user, organization) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The effective capability set.
    Granted(HashSet<Capability>),
    /// A precondition failed; no capabilities apply.
    Denied(DenyReason),
}

impl Resolution {
    pub fn is_granted(&self) -> bool {
        matches!(self, Resolution::Granted(_))
    }
}

/// Outcome of a guard authorization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied { reason: DenyReason },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn denied(reason: DenyReason) -> Self {
        Decision::Denied { reason }
    }
}

/// Point-in-time answer to "is there headroom for one more unit?".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaStatus {
    pub allowed: bool,
    pub limit: i64,
    pub current: i64,
    /// Slots left; `-1` when the limit is unlimited.
    pub remaining: i64,
}

impl QuotaStatus {
    pub(crate) fn from_counter(counter: QuotaCounter) -> Self {
        Self {
            allowed: counter.has_headroom(),
            limit: counter.limit,
            current: counter.current,
            remaining: counter.remaining(),
        }
    }
}

/// One row of the usage dashboard snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceUsage {
    pub current: i64,
    pub limit: i64,
    /// Percent of the limit consumed; `None` when unlimited.
    pub percentage: Option<f64>,
}

impl ResourceUsage {
    pub(crate) fn from_counter(counter: QuotaCounter) -> Self {
        let percentage = if counter.is_unlimited() {
            None
        } else if counter.limit == 0 {
            Some(100.0)
        } else {
            Some(counter.current as f64 * 100.0 / counter.limit as f64)
        };
        Self {
            current: counter.current,
            limit: counter.limit,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_reason_display() {
        assert_eq!(
            DenyReason::NoMembership.to_string(),
            "user is not a member of the organization"
        );
        let exceeded = DenyReason::QuotaExceeded {
            resource: ResourceKind::Records,
            limit: 100,
            current: 100,
        };
        assert_eq!(exceeded.to_string(), "quota exceeded for records: 100/100");
    }

    #[test]
    fn test_quota_status_from_counter() {
        let status = QuotaStatus::from_counter(QuotaCounter::new(3, 10));
        assert!(status.allowed);
        assert_eq!(status.remaining, 7);

        let full = QuotaStatus::from_counter(QuotaCounter::new(10, 10));
        assert!(!full.allowed);
        assert_eq!(full.remaining, 0);

        let unlimited =
            QuotaStatus::from_counter(QuotaCounter::new(500_000, QuotaCounter::UNLIMITED));
        assert!(unlimited.allowed);
        assert_eq!(unlimited.remaining, QuotaCounter::UNLIMITED);
    }

    #[test]
    fn test_resource_usage_percentage() {
        let half = ResourceUsage::from_counter(QuotaCounter::new(50, 100));
        assert_eq!(half.percentage, Some(50.0));

        let unlimited =
            ResourceUsage::from_counter(QuotaCounter::new(42, QuotaCounter::UNLIMITED));
        assert_eq!(unlimited.percentage, None);

        // A zero limit means the plan grants none of the resource at all.
        let none = ResourceUsage::from_counter(QuotaCounter::new(0, 0));
        assert_eq!(none.percentage, Some(100.0));
    }
}
