//! Platform login cookies used by the crawler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Platform, Resource, RunState, Trackable};

pub type CookieID = i64;

/// A stored login session for one platform account.
///
/// The list endpoint never returns `value`; fetch the detail to see it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Cookie {
    pub id: CookieID,

    pub platform: Platform,

    /// Display name chosen by the operator.
    pub name: String,

    /// Platform account the cookie belongs to.
    #[serde(default)]
    pub account: Option<String>,

    /// Raw cookie header. Detail endpoint only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    pub status: CookieStatus,

    #[serde(default)]
    pub remark: Option<String>,

    /// When the backend last validated the session.
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CookieStatus {
    Active,
    /// A `refresh` action is validating the session.
    Checking,
    Expired,
    Disabled,
}

impl CookieStatus {
    pub const SELECTABLE: [&'static str; 3] = ["active", "expired", "disabled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CookieStatus::Active => "active",
            CookieStatus::Checking => "checking",
            CookieStatus::Expired => "expired",
            CookieStatus::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for CookieStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Resource for Cookie {
    type Id = CookieID;
    const PATH: &'static str = "/cookies";
    const LABEL: &'static str = "cookie";
    const LIST_IS_PARTIAL: bool = true;

    fn id(&self) -> CookieID {
        self.id
    }
}

impl Trackable for Cookie {
    const ACTIONS: &'static [&'static str] = &["refresh"];

    fn status_label(&self) -> String {
        self.status.to_string()
    }

    fn run_state(&self) -> RunState {
        match self.status {
            CookieStatus::Checking => RunState::Running,
            CookieStatus::Active => RunState::Succeeded,
            CookieStatus::Expired | CookieStatus::Disabled => RunState::Failed,
        }
    }
}
