//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

/// Organization identifier (the billing unit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub Uuid);

/// Subscription identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_ids_equality() {
        let uuid = Uuid::new_v4();
        let user_id1 = UserId(uuid);
        let user_id2 = UserId(uuid);
        assert_eq!(user_id1, user_id2);

        let different_uuid = Uuid::new_v4();
        let user_id3 = UserId(different_uuid);
        assert_ne!(user_id1, user_id3);
    }

    #[test]
    fn test_typed_ids_hash() {
        use std::collections::HashSet;

        let uuid = Uuid::new_v4();
        let org_id1 = OrganizationId(uuid);
        let org_id2 = OrganizationId(uuid);

        let mut set = HashSet::new();
        set.insert(org_id1);
        assert!(set.contains(&org_id2));
    }

    #[test]
    fn test_typed_ids_display() {
        let uuid = Uuid::new_v4();
        assert_eq!(UserId(uuid).to_string(), uuid.to_string());
        assert_eq!(OrganizationId(uuid).to_string(), uuid.to_string());
        assert_eq!(SubscriptionId(uuid).to_string(), uuid.to_string());
    }

    #[test]
    fn test_typed_ids_inner_access() {
        let uuid = Uuid::new_v4();
        let sub_id = SubscriptionId(uuid);
        assert_eq!(sub_id.0, uuid);
    }
}
