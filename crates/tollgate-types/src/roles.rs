//! Organizational roles and their capability sets.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Capability;

/// Role within an organization.
///
/// Unlike tiers, roles do not inherit: each role lists its full capability
/// set explicitly. Owner's set must remain a superset of every other role's
/// set (pinned by a test below).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRole {
    Owner,   // Full control, billing, can delete org
    Admin,   // Manage members and settings, but not billing
    Manager, // Day-to-day operations plus destructive record/campaign actions
    Member,  // Create and edit, no destructive or administrative actions
    Viewer,  // Read-only
}

impl OrganizationRole {
    /// All roles, most to least privileged.
    pub fn all() -> &'static [OrganizationRole] {
        &[
            OrganizationRole::Owner,
            OrganizationRole::Admin,
            OrganizationRole::Manager,
            OrganizationRole::Member,
            OrganizationRole::Viewer,
        ]
    }

    /// The full capability set for this role (flat, no inheritance).
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            OrganizationRole::Owner => Capability::all(),
            OrganizationRole::Admin => &[
                Capability::RecordsRead,
                Capability::RecordsWrite,
                Capability::RecordsDelete,
                Capability::RecordsExport,
                Capability::CampaignsRead,
                Capability::CampaignsWrite,
                Capability::CampaignsDelete,
                Capability::AutomationsRead,
                Capability::AutomationsWrite,
                Capability::IntegrationsManage,
                Capability::MembersRead,
                Capability::MembersInvite,
                Capability::MembersManage,
                Capability::OrgSettings,
                Capability::UsageView,
                Capability::ApiAccess,
            ],
            OrganizationRole::Manager => &[
                Capability::RecordsRead,
                Capability::RecordsWrite,
                Capability::RecordsDelete,
                Capability::RecordsExport,
                Capability::CampaignsRead,
                Capability::CampaignsWrite,
                Capability::CampaignsDelete,
                Capability::AutomationsRead,
                Capability::AutomationsWrite,
                Capability::IntegrationsManage,
                Capability::MembersRead,
                Capability::MembersInvite,
                Capability::UsageView,
                Capability::ApiAccess,
            ],
            OrganizationRole::Member => &[
                Capability::RecordsRead,
                Capability::RecordsWrite,
                Capability::RecordsExport,
                Capability::CampaignsRead,
                Capability::CampaignsWrite,
                Capability::AutomationsRead,
                Capability::MembersRead,
                Capability::UsageView,
                Capability::ApiAccess,
            ],
            OrganizationRole::Viewer => &[
                Capability::RecordsRead,
                Capability::CampaignsRead,
                Capability::AutomationsRead,
                Capability::MembersRead,
                Capability::UsageView,
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationRole::Owner => "owner",
            OrganizationRole::Admin => "admin",
            OrganizationRole::Manager => "manager",
            OrganizationRole::Member => "member",
            OrganizationRole::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for OrganizationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for parsing OrganizationRole from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOrganizationRoleError(pub String);

impl std::fmt::Display for ParseOrganizationRoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid organization role: {}", self.0)
    }
}

impl std::error::Error for ParseOrganizationRoleError {}

impl FromStr for OrganizationRole {
    type Err = ParseOrganizationRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(OrganizationRole::Owner),
            "admin" => Ok(OrganizationRole::Admin),
            "manager" => Ok(OrganizationRole::Manager),
            "member" => Ok(OrganizationRole::Member),
            "viewer" => Ok(OrganizationRole::Viewer),
            _ => Err(ParseOrganizationRoleError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_owner_is_superset_of_every_role() {
        // Guards against drift in the hand-maintained per-role lists.
        let owner: HashSet<_> = OrganizationRole::Owner.capabilities().iter().collect();
        for role in OrganizationRole::all() {
            for cap in role.capabilities() {
                assert!(owner.contains(cap), "{:?} has {:?} but Owner does not", role, cap);
            }
        }
    }

    #[test]
    fn test_role_lists_have_no_duplicates() {
        for role in OrganizationRole::all() {
            let set: HashSet<_> = role.capabilities().iter().collect();
            assert_eq!(set.len(), role.capabilities().len(), "{:?} lists a capability twice", role);
        }
    }

    #[test]
    fn test_manager_includes_records_write() {
        assert!(OrganizationRole::Manager
            .capabilities()
            .contains(&Capability::RecordsWrite));
    }

    #[test]
    fn test_viewer_is_read_only() {
        let caps = OrganizationRole::Viewer.capabilities();
        assert!(!caps.contains(&Capability::RecordsWrite));
        assert!(!caps.contains(&Capability::RecordsDelete));
        assert!(!caps.contains(&Capability::OrgSettings));
    }

    #[test]
    fn test_only_owner_holds_billing() {
        for role in OrganizationRole::all() {
            let has_billing = role.capabilities().contains(&Capability::OrgBilling);
            assert_eq!(has_billing, *role == OrganizationRole::Owner, "{:?}", role);
        }
    }

    #[test]
    fn test_role_roundtrip() {
        for role in OrganizationRole::all() {
            let s = role.as_str();
            let parsed: OrganizationRole = s.parse().unwrap();
            assert_eq!(*role, parsed);
        }
    }

    #[test]
    fn test_role_parse_invalid() {
        assert!("superuser".parse::<OrganizationRole>().is_err());
        assert!("OWNER".parse::<OrganizationRole>().is_err()); // Case sensitive
        assert!("".parse::<OrganizationRole>().is_err());
    }

    #[test]
    fn test_parse_role_error_display() {
        let err = ParseOrganizationRoleError("intern".to_string());
        assert!(err.to_string().contains("intern"));
    }
}
