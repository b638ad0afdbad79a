//! Membership records binding users to organizations.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CapabilityOverride, OrganizationId, OrganizationRole, UserId};

/// Lifecycle state of a membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Suspended,
    Invited,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Suspended => "suspended",
            MembershipStatus::Invited => "invited",
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MembershipStatus::Active),
            "suspended" => Ok(MembershipStatus::Suspended),
            "invited" => Ok(MembershipStatus::Invited),
            _ => Err(format!("invalid membership status: {}", s)),
        }
    }
}

/// Organization member record.
///
/// `overrides` is the per-member exception list layered atop tier/role
/// resolution; a Deny entry beats a Grant entry for the same capability.
#[derive(Clone, Debug)]
pub struct Membership {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: OrganizationRole,
    pub status: MembershipStatus,
    pub overrides: Vec<CapabilityOverride>,
    pub invited_by: Option<UserId>,
    pub joined_at: DateTime<Utc>,
}
