//! The capability catalog: every named permission the platform knows about.
//!
//! The catalog is a closed set. Grouping is informational only; the engine
//! treats capabilities as a flat set.

use serde::{Deserialize, Serialize};

/// An atomic, named permission to perform one kind of action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    // Records
    RecordsRead,
    RecordsWrite,
    RecordsDelete,
    RecordsExport,

    // Campaigns
    CampaignsRead,
    CampaignsWrite,
    CampaignsDelete,

    // Automations
    AutomationsRead,
    AutomationsWrite,

    // Integrations
    IntegrationsManage,

    // Members
    MembersRead,
    MembersInvite,
    MembersManage,

    // Organization administration
    OrgSettings,
    OrgBilling,
    OrgDelete,
    UsageView,

    // API
    ApiAccess,
}

/// Subject area a capability belongs to. Informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityGroup {
    Records,
    Campaigns,
    Automations,
    Integrations,
    Members,
    Organization,
    Api,
}

impl Capability {
    /// Every capability in the catalog.
    pub fn all() -> &'static [Capability] {
        &[
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
            Capability::OrgBilling,
            Capability::OrgDelete,
            Capability::UsageView,
            Capability::ApiAccess,
        ]
    }

    pub fn group(&self) -> CapabilityGroup {
        match self {
            Capability::RecordsRead
            | Capability::RecordsWrite
            | Capability::RecordsDelete
            | Capability::RecordsExport => CapabilityGroup::Records,
            Capability::CampaignsRead
            | Capability::CampaignsWrite
            | Capability::CampaignsDelete => CapabilityGroup::Campaigns,
            Capability::AutomationsRead | Capability::AutomationsWrite => {
                CapabilityGroup::Automations
            }
            Capability::IntegrationsManage => CapabilityGroup::Integrations,
            Capability::MembersRead | Capability::MembersInvite | Capability::MembersManage => {
                CapabilityGroup::Members
            }
            Capability::OrgSettings
            | Capability::OrgBilling
            | Capability::OrgDelete
            | Capability::UsageView => CapabilityGroup::Organization,
            Capability::ApiAccess => CapabilityGroup::Api,
        }
    }

    /// Human description for settings pages and audit views.
    pub fn description(&self) -> &'static str {
        match self {
            Capability::RecordsRead => "View records",
            Capability::RecordsWrite => "Create and edit records",
            Capability::RecordsDelete => "Delete records",
            Capability::RecordsExport => "Export records",
            Capability::CampaignsRead => "View campaigns",
            Capability::CampaignsWrite => "Create and edit campaigns",
            Capability::CampaignsDelete => "Delete campaigns",
            Capability::AutomationsRead => "View automation rules",
            Capability::AutomationsWrite => "Create and edit automation rules",
            Capability::IntegrationsManage => "Connect and manage integrations",
            Capability::MembersRead => "View organization members",
            Capability::MembersInvite => "Invite new members",
            Capability::MembersManage => "Change member roles and remove members",
            Capability::OrgSettings => "Manage organization settings",
            Capability::OrgBilling => "Manage billing and subscription",
            Capability::OrgDelete => "Delete the organization",
            Capability::UsageView => "View usage and quota statistics",
            Capability::ApiAccess => "Use the public API",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::RecordsRead => "records.read",
            Capability::RecordsWrite => "records.write",
            Capability::RecordsDelete => "records.delete",
            Capability::RecordsExport => "records.export",
            Capability::CampaignsRead => "campaigns.read",
            Capability::CampaignsWrite => "campaigns.write",
            Capability::CampaignsDelete => "campaigns.delete",
            Capability::AutomationsRead => "automations.read",
            Capability::AutomationsWrite => "automations.write",
            Capability::IntegrationsManage => "integrations.manage",
            Capability::MembersRead => "members.read",
            Capability::MembersInvite => "members.invite",
            Capability::MembersManage => "members.manage",
            Capability::OrgSettings => "org.settings",
            Capability::OrgBilling => "org.billing",
            Capability::OrgDelete => "org.delete",
            Capability::UsageView => "usage.view",
            Capability::ApiAccess => "api.access",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for parsing a Capability from string.
///
/// An unknown capability identifier is a configuration defect, not a runtime
/// condition; callers at API edges should fail closed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCapabilityError(pub String);

impl std::fmt::Display for ParseCapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown capability: {}", self.0)
    }
}

impl std::error::Error for ParseCapabilityError {}

impl std::str::FromStr for Capability {
    type Err = ParseCapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "records.read" => Ok(Capability::RecordsRead),
            "records.write" => Ok(Capability::RecordsWrite),
            "records.delete" => Ok(Capability::RecordsDelete),
            "records.export" => Ok(Capability::RecordsExport),
            "campaigns.read" => Ok(Capability::CampaignsRead),
            "campaigns.write" => Ok(Capability::CampaignsWrite),
            "campaigns.delete" => Ok(Capability::CampaignsDelete),
            "automations.read" => Ok(Capability::AutomationsRead),
            "automations.write" => Ok(Capability::AutomationsWrite),
            "integrations.manage" => Ok(Capability::IntegrationsManage),
            "members.read" => Ok(Capability::MembersRead),
            "members.invite" => Ok(Capability::MembersInvite),
            "members.manage" => Ok(Capability::MembersManage),
            "org.settings" => Ok(Capability::OrgSettings),
            "org.billing" => Ok(Capability::OrgBilling),
            "org.delete" => Ok(Capability::OrgDelete),
            "usage.view" => Ok(Capability::UsageView),
            "api.access" => Ok(Capability::ApiAccess),
            _ => Err(ParseCapabilityError(s.to_string())),
        }
    }
}

/// Whether an override entry adds or removes a capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideEffect {
    Grant,
    Deny,
}

/// A per-membership exception layered atop tier/role resolution.
///
/// A `Deny` entry always wins over a `Grant` entry for the same capability,
/// and over tier/role inclusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityOverride {
    pub capability: Capability,
    pub effect: OverrideEffect,
}

impl CapabilityOverride {
    pub fn grant(capability: Capability) -> Self {
        Self {
            capability,
            effect: OverrideEffect::Grant,
        }
    }

    pub fn deny(capability: Capability) -> Self {
        Self {
            capability,
            effect: OverrideEffect::Deny,
        }
    }
}
