//! Permission resolution.
//!
//! The effective capability set for a user in an organization is
//!
//! ```text
//! ((tier capabilities ∩ role capabilities) ∪ override grants) \ override denials
//! ```
//!
//! A denial override always wins over a grant for the same capability,
//! regardless of the order the overrides were applied in.

use std::collections::HashSet;
use std::sync::Arc;

use tollgate_storage::{Store, StoreError};
use tollgate_types::{
    Capability, CapabilityOverride, MembershipStatus, OrganizationId, OverrideEffect,
    SubscriptionStatus, UserId,
};

use crate::config::EngineConfig;
use crate::decision::{DenyReason, Resolution};
use crate::error::EngineError;

/// Resolves effective capabilities and manages per-member overrides.
pub struct PermissionEngine<S: Store> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: Store> PermissionEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Resolve the full effective capability set for a user in an
    /// organization.
    ///
    /// Preconditions are checked in a fixed order, each with its own deny
    /// reason: membership exists, membership active, subscription exists,
    /// subscription usable. A precondition failure is a `Denied` resolution,
    /// not an error; `Err` means the backend itself failed.
    pub async fn resolve(
        &self,
        user_id: &UserId,
        org_id: &OrganizationId,
    ) -> Result<Resolution, EngineError> {
        let membership = match self.store.get_membership(org_id, user_id).await {
            Ok(m) => m,
            Err(StoreError::NotFound) => return Ok(Resolution::Denied(DenyReason::NoMembership)),
            Err(e) => return Err(e.into()),
        };

        if membership.status != MembershipStatus::Active {
            return Ok(Resolution::Denied(DenyReason::MembershipInactive));
        }

        let subscription = match self.store.get_subscription(org_id).await {
            Ok(s) => s,
            Err(StoreError::NotFound) => return Ok(Resolution::Denied(DenyReason::NoSubscription)),
            Err(e) => return Err(e.into()),
        };

        if !self.config.is_usable(subscription.status) {
            return Ok(Resolution::Denied(DenyReason::SubscriptionInactive));
        }

        let tier_caps = subscription.tier.capabilities();
        let mut effective: HashSet<Capability> = membership
            .role
            .capabilities()
            .iter()
            .filter(|cap| tier_caps.contains(cap))
            .copied()
            .collect();

        for o in &membership.overrides {
            if o.effect == OverrideEffect::Grant {
                effective.insert(o.capability);
            }
        }
        // Denials applied last: a deny beats a grant for the same capability.
        for o in &membership.overrides {
            if o.effect == OverrideEffect::Deny {
                effective.remove(&o.capability);
            }
        }

        if subscription.status == SubscriptionStatus::Trialing {
            for cap in &self.config.trial_restricted {
                effective.remove(cap);
            }
        }

        Ok(Resolution::Granted(effective))
    }

    /// Whether the user holds one capability in the organization.
    ///
    /// Any failed precondition yields `Ok(false)`, never an error.
    pub async fn has_capability(
        &self,
        user_id: &UserId,
        org_id: &OrganizationId,
        capability: Capability,
    ) -> Result<bool, EngineError> {
        match self.resolve(user_id, org_id).await? {
            Resolution::Granted(caps) => Ok(caps.contains(&capability)),
            Resolution::Denied(_) => Ok(false),
        }
    }

    /// Add an override to a membership. Idempotent: applying an override that
    /// is already present is a no-op.
    ///
    /// Override mutations are read-modify-write; concurrent edits to the same
    /// membership are last-write-wins.
    pub async fn grant_override(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        capability_override: CapabilityOverride,
    ) -> Result<(), EngineError> {
        let membership = self.store.get_membership(org_id, user_id).await?;

        let mut overrides = membership.overrides;
        if overrides.contains(&capability_override) {
            return Ok(());
        }
        // At most one override per capability.
        overrides.retain(|o| o.capability != capability_override.capability);
        overrides.push(capability_override);

        self.store
            .set_membership_overrides(org_id, user_id, &overrides)
            .await?;

        tracing::info!(
            org_id = %org_id,
            user_id = %user_id,
            capability = %capability_override.capability,
            effect = ?capability_override.effect,
            "capability override applied"
        );
        Ok(())
    }

    /// Remove any override for the capability. Idempotent: revoking an
    /// override that does not exist is a no-op.
    pub async fn revoke_override(
        &self,
        org_id: &OrganizationId,
        user_id: &UserId,
        capability: Capability,
    ) -> Result<(), EngineError> {
        let membership = self.store.get_membership(org_id, user_id).await?;

        let mut overrides = membership.overrides;
        let before = overrides.len();
        overrides.retain(|o| o.capability != capability);
        if overrides.len() == before {
            return Ok(());
        }

        self.store
            .set_membership_overrides(org_id, user_id, &overrides)
            .await?;

        tracing::info!(
            org_id = %org_id,
            user_id = %user_id,
            capability = %capability,
            "capability override revoked"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tollgate_store_memory::MemoryStore;
    use tollgate_storage::{AddMemberParams, CreateSubscriptionParams, MockStore};
    use tollgate_types::{OrganizationRole, Tier};
    use uuid::Uuid;

    fn engine(store: Arc<MemoryStore>) -> PermissionEngine<MemoryStore> {
        PermissionEngine::new(store, EngineConfig::default())
    }

    async fn seed(
        store: &MemoryStore,
        tier: Tier,
        sub_status: SubscriptionStatus,
        role: OrganizationRole,
        member_status: MembershipStatus,
    ) -> (OrganizationId, UserId) {
        let org_id = OrganizationId(Uuid::new_v4());
        let user_id = UserId(Uuid::new_v4());
        let now = Utc::now();

        store
            .create_subscription(&CreateSubscriptionParams {
                organization_id: org_id,
                tier,
                status: sub_status,
                current_period_start: now,
                current_period_end: now + Duration::days(30),
            })
            .await
            .unwrap();
        store
            .add_member(&AddMemberParams {
                organization_id: org_id,
                user_id,
                role,
                status: member_status,
                invited_by: None,
            })
            .await
            .unwrap();
        (org_id, user_id)
    }

    #[tokio::test]
    async fn pro_manager_active_has_records_write() {
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Pro,
            SubscriptionStatus::Active,
            OrganizationRole::Manager,
            MembershipStatus::Active,
        )
        .await;

        let engine = engine(store);
        assert!(engine
            .has_capability(&user_id, &org_id, Capability::RecordsWrite)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn deny_override_removes_capability() {
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Pro,
            SubscriptionStatus::Active,
            OrganizationRole::Manager,
            MembershipStatus::Active,
        )
        .await;

        let engine = engine(store);
        engine
            .grant_override(
                &org_id,
                &user_id,
                CapabilityOverride::deny(Capability::RecordsWrite),
            )
            .await
            .unwrap();

        assert!(!engine
            .has_capability(&user_id, &org_id, Capability::RecordsWrite)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn denial_dominates_regardless_of_order() {
        // Same capability granted and denied; the deny must win whichever
        // entry was stored first.
        for first_deny in [true, false] {
            let store = Arc::new(MemoryStore::new());
            let (org_id, user_id) = seed(
                &store,
                Tier::Basic,
                SubscriptionStatus::Active,
                OrganizationRole::Viewer,
                MembershipStatus::Active,
            )
            .await;

            let overrides = if first_deny {
                vec![
                    CapabilityOverride::deny(Capability::RecordsExport),
                    CapabilityOverride::grant(Capability::RecordsExport),
                ]
            } else {
                vec![
                    CapabilityOverride::grant(Capability::RecordsExport),
                    CapabilityOverride::deny(Capability::RecordsExport),
                ]
            };
            store
                .set_membership_overrides(&org_id, &user_id, &overrides)
                .await
                .unwrap();

            let engine = engine(store);
            assert!(!engine
                .has_capability(&user_id, &org_id, Capability::RecordsExport)
                .await
                .unwrap());
        }
    }

    #[tokio::test]
    async fn grant_override_adds_beyond_plan() {
        // Basic tier has no records.export; a grant override supplies it.
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Basic,
            SubscriptionStatus::Active,
            OrganizationRole::Member,
            MembershipStatus::Active,
        )
        .await;

        let engine = engine(store);
        assert!(!engine
            .has_capability(&user_id, &org_id, Capability::RecordsExport)
            .await
            .unwrap());

        engine
            .grant_override(
                &org_id,
                &user_id,
                CapabilityOverride::grant(Capability::RecordsExport),
            )
            .await
            .unwrap();
        assert!(engine
            .has_capability(&user_id, &org_id, Capability::RecordsExport)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn effective_set_is_tier_role_intersection() {
        // Viewer on Enterprise: the role, not the plan, is the ceiling.
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Enterprise,
            SubscriptionStatus::Active,
            OrganizationRole::Viewer,
            MembershipStatus::Active,
        )
        .await;

        let engine = engine(store);
        match engine.resolve(&user_id, &org_id).await.unwrap() {
            Resolution::Granted(caps) => {
                assert!(caps.contains(&Capability::RecordsRead));
                assert!(!caps.contains(&Capability::RecordsWrite));
                assert!(!caps.contains(&Capability::OrgBilling));
            }
            Resolution::Denied(reason) => panic!("unexpected denial: {}", reason),
        }

        // Member on Basic: the plan caps the role.
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Basic,
            SubscriptionStatus::Active,
            OrganizationRole::Member,
            MembershipStatus::Active,
        )
        .await;

        let engine = PermissionEngine::new(store, EngineConfig::default());
        match engine.resolve(&user_id, &org_id).await.unwrap() {
            Resolution::Granted(caps) => {
                assert!(caps.contains(&Capability::RecordsWrite));
                // Member role holds records.export but Basic does not.
                assert!(!caps.contains(&Capability::RecordsExport));
            }
            Resolution::Denied(reason) => panic!("unexpected denial: {}", reason),
        }
    }

    #[tokio::test]
    async fn precondition_failures_deny_with_distinct_reasons() {
        // No membership at all.
        let store = Arc::new(MemoryStore::new());
        let org_id = OrganizationId(Uuid::new_v4());
        let user_id = UserId(Uuid::new_v4());
        let now = Utc::now();
        store
            .create_subscription(&CreateSubscriptionParams {
                organization_id: org_id,
                tier: Tier::Pro,
                status: SubscriptionStatus::Active,
                current_period_start: now,
                current_period_end: now + Duration::days(30),
            })
            .await
            .unwrap();
        let e = engine(Arc::clone(&store));
        assert_eq!(
            e.resolve(&user_id, &org_id).await.unwrap(),
            Resolution::Denied(DenyReason::NoMembership)
        );

        // Suspended membership.
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Pro,
            SubscriptionStatus::Active,
            OrganizationRole::Member,
            MembershipStatus::Suspended,
        )
        .await;
        let e = engine(Arc::clone(&store));
        assert_eq!(
            e.resolve(&user_id, &org_id).await.unwrap(),
            Resolution::Denied(DenyReason::MembershipInactive)
        );

        // Pending invite counts as inactive too.
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Pro,
            SubscriptionStatus::Active,
            OrganizationRole::Member,
            MembershipStatus::Invited,
        )
        .await;
        let e = engine(Arc::clone(&store));
        assert_eq!(
            e.resolve(&user_id, &org_id).await.unwrap(),
            Resolution::Denied(DenyReason::MembershipInactive)
        );

        // Active member, no subscription.
        let store = Arc::new(MemoryStore::new());
        let org_id = OrganizationId(Uuid::new_v4());
        let user_id = UserId(Uuid::new_v4());
        store
            .add_member(&AddMemberParams {
                organization_id: org_id,
                user_id,
                role: OrganizationRole::Owner,
                status: MembershipStatus::Active,
                invited_by: None,
            })
            .await
            .unwrap();
        let e = engine(Arc::clone(&store));
        assert_eq!(
            e.resolve(&user_id, &org_id).await.unwrap(),
            Resolution::Denied(DenyReason::NoSubscription)
        );

        // Canceled / past-due / incomplete subscription.
        for status in [
            SubscriptionStatus::Canceled,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Incomplete,
        ] {
            let store = Arc::new(MemoryStore::new());
            let (org_id, user_id) = seed(
                &store,
                Tier::Pro,
                status,
                OrganizationRole::Owner,
                MembershipStatus::Active,
            )
            .await;
            let e = engine(Arc::clone(&store));
            assert_eq!(
                e.resolve(&user_id, &org_id).await.unwrap(),
                Resolution::Denied(DenyReason::SubscriptionInactive)
            );
        }
    }

    #[tokio::test]
    async fn has_capability_is_false_not_error_on_failed_preconditions() {
        let store = Arc::new(MemoryStore::new());
        let org_id = OrganizationId(Uuid::new_v4());
        let user_id = UserId(Uuid::new_v4());

        let engine = engine(store);
        let result = engine
            .has_capability(&user_id, &org_id, Capability::RecordsRead)
            .await;
        assert!(matches!(result, Ok(false)));
    }

    #[tokio::test]
    async fn trialing_withholds_restricted_capabilities_only() {
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Pro,
            SubscriptionStatus::Trialing,
            OrganizationRole::Owner,
            MembershipStatus::Active,
        )
        .await;

        let engine = engine(store);
        assert!(!engine
            .has_capability(&user_id, &org_id, Capability::OrgBilling)
            .await
            .unwrap());
        assert!(engine
            .has_capability(&user_id, &org_id, Capability::RecordsWrite)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn overrides_are_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Pro,
            SubscriptionStatus::Active,
            OrganizationRole::Member,
            MembershipStatus::Active,
        )
        .await;

        let engine = engine(Arc::clone(&store));
        let grant = CapabilityOverride::grant(Capability::IntegrationsManage);
        engine.grant_override(&org_id, &user_id, grant).await.unwrap();
        engine.grant_override(&org_id, &user_id, grant).await.unwrap();

        let membership = store.get_membership(&org_id, &user_id).await.unwrap();
        assert_eq!(membership.overrides.len(), 1);

        // Revoking twice is also a no-op the second time.
        engine
            .revoke_override(&org_id, &user_id, Capability::IntegrationsManage)
            .await
            .unwrap();
        engine
            .revoke_override(&org_id, &user_id, Capability::IntegrationsManage)
            .await
            .unwrap();

        let membership = store.get_membership(&org_id, &user_id).await.unwrap();
        assert!(membership.overrides.is_empty());
    }

    #[tokio::test]
    async fn regrant_with_new_effect_replaces_old_override() {
        let store = Arc::new(MemoryStore::new());
        let (org_id, user_id) = seed(
            &store,
            Tier::Pro,
            SubscriptionStatus::Active,
            OrganizationRole::Manager,
            MembershipStatus::Active,
        )
        .await;

        let engine = engine(Arc::clone(&store));
        engine
            .grant_override(
                &org_id,
                &user_id,
                CapabilityOverride::deny(Capability::RecordsWrite),
            )
            .await
            .unwrap();
        engine
            .grant_override(
                &org_id,
                &user_id,
                CapabilityOverride::grant(Capability::RecordsWrite),
            )
            .await
            .unwrap();

        let membership = store.get_membership(&org_id, &user_id).await.unwrap();
        assert_eq!(membership.overrides.len(), 1);
        assert!(engine
            .has_capability(&user_id, &org_id, Capability::RecordsWrite)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn storage_fault_propagates_as_error() {
        let mut mock = MockStore::new();
        mock.expect_get_membership()
            .returning(|_, _| Err(StoreError::Backend("connection refused".into())));

        let engine = PermissionEngine::new(Arc::new(mock), EngineConfig::default());
        let result = engine
            .resolve(
                &UserId(Uuid::new_v4()),
                &OrganizationId(Uuid::new_v4()),
            )
            .await;
        assert!(matches!(result, Err(EngineError::Storage(_))));
    }
}
