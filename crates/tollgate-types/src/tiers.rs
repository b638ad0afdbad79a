//! Plan tiers and the capabilities/limits each tier unlocks.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Capability, QuotaCounter, ResourceKind};

/// Subscription pricing tier, lowest to highest.
///
/// Tiers strictly add capabilities: the effective set for a tier is the union
/// of its own incremental set and the incremental sets of every tier below it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Basic,
    Pro,
    Agency,
    Enterprise,
}

impl Tier {
    /// All tiers in rank order.
    pub fn all() -> &'static [Tier] {
        &[Tier::Basic, Tier::Pro, Tier::Agency, Tier::Enterprise]
    }

    /// Position in the tier ladder (0 = lowest).
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Basic => 0,
            Tier::Pro => 1,
            Tier::Agency => 2,
            Tier::Enterprise => 3,
        }
    }

    /// Capabilities newly unlocked at this tier (not inherited from below).
    pub fn incremental_capabilities(&self) -> &'static [Capability] {
        match self {
            Tier::Basic => &[
                Capability::RecordsRead,
                Capability::RecordsWrite,
                Capability::RecordsDelete,
                Capability::CampaignsRead,
                Capability::MembersRead,
                Capability::MembersInvite,
                Capability::OrgSettings,
                Capability::OrgBilling,
                Capability::OrgDelete,
                Capability::UsageView,
            ],
            Tier::Pro => &[
                Capability::RecordsExport,
                Capability::CampaignsWrite,
                Capability::CampaignsDelete,
                Capability::AutomationsRead,
            ],
            Tier::Agency => &[
                Capability::AutomationsWrite,
                Capability::IntegrationsManage,
                Capability::MembersManage,
            ],
            Tier::Enterprise => &[Capability::ApiAccess],
        }
    }

    /// Cumulative capability set: this tier plus everything below it.
    pub fn capabilities(&self) -> HashSet<Capability> {
        let mut set = HashSet::new();
        for tier in Tier::all() {
            if tier.rank() <= self.rank() {
                set.extend(tier.incremental_capabilities().iter().copied());
            }
        }
        set
    }

    /// Plan-derived quota limit for a resource kind.
    ///
    /// `QuotaCounter::UNLIMITED` (-1) means no limit.
    pub fn quota_limit(&self, kind: ResourceKind) -> i64 {
        match (self, kind) {
            (Tier::Basic, ResourceKind::Records) => 100,
            (Tier::Basic, ResourceKind::CampaignAssets) => 10,
            (Tier::Basic, ResourceKind::AutomationRules) => 0,
            (Tier::Basic, ResourceKind::Integrations) => 1,
            (Tier::Basic, ResourceKind::UserSeats) => 3,

            (Tier::Pro, ResourceKind::Records) => 10_000,
            (Tier::Pro, ResourceKind::CampaignAssets) => 250,
            (Tier::Pro, ResourceKind::AutomationRules) => 10,
            (Tier::Pro, ResourceKind::Integrations) => 3,
            (Tier::Pro, ResourceKind::UserSeats) => 10,

            (Tier::Agency, ResourceKind::Records) => 100_000,
            (Tier::Agency, ResourceKind::CampaignAssets) => 2_500,
            (Tier::Agency, ResourceKind::AutomationRules) => 250,
            (Tier::Agency, ResourceKind::Integrations) => 10,
            (Tier::Agency, ResourceKind::UserSeats) => 50,

            (Tier::Enterprise, _) => QuotaCounter::UNLIMITED,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Pro => "pro",
            Tier::Agency => "agency",
            Tier::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Tier::Basic),
            "pro" => Ok(Tier::Pro),
            "agency" => Ok(Tier::Agency),
            "enterprise" => Ok(Tier::Enterprise),
            _ => Err(format!("invalid tier: {}", s)),
        }
    }
}
