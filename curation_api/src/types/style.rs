//! Style definitions: named bundles of features scored against the library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Resource, RunState, Trackable};

pub type StyleID = i64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StyleDefinition {
    pub id: StyleID,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Comma-separated feature ids.
    #[serde(default)]
    pub feature_ids: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Status of the `calculate` action that scores images for this style.
    #[serde(default = "default_calc_status")]
    pub calc_status: CalcStatus,

    /// Images matched by the last calculation.
    #[serde(default)]
    pub matched_count: Option<i64>,

    pub created_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

fn default_calc_status() -> CalcStatus {
    CalcStatus::Idle
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CalcStatus {
    Idle,
    Calculating,
    Done,
    Failed,
}

impl std::fmt::Display for CalcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CalcStatus::Idle => "idle",
                CalcStatus::Calculating => "calculating",
                CalcStatus::Done => "done",
                CalcStatus::Failed => "failed",
            }
        )
    }
}

impl Resource for StyleDefinition {
    type Id = StyleID;
    const PATH: &'static str = "/styles";
    const LABEL: &'static str = "style";

    fn id(&self) -> StyleID {
        self.id
    }
}

impl Trackable for StyleDefinition {
    const ACTIONS: &'static [&'static str] = &["calculate"];

    fn status_label(&self) -> String {
        self.calc_status.to_string()
    }

    fn run_state(&self) -> RunState {
        match self.calc_status {
            CalcStatus::Idle => RunState::Pending,
            CalcStatus::Calculating => RunState::Running,
            CalcStatus::Done => RunState::Succeeded,
            CalcStatus::Failed => RunState::Failed,
        }
    }
}
