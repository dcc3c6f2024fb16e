//! Curated sample sets and their packaging status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Resource, RunState, Trackable};

pub type SampleSetID = i64;

/// A curated collection of images, filled by hand or by a feature query.
///
/// List rows omit `image_ids`; the detail endpoint includes it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SampleSet {
    pub id: SampleSetID,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub acquire_type: AcquireType,

    /// Comma-separated image ids for manual sets. Detail endpoint only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ids: Option<String>,

    /// Comma-separated feature ids for automatic sets.
    #[serde(default)]
    pub feature_ids: Option<String>,

    /// Minimum aesthetic score for automatic sets.
    #[serde(default)]
    pub min_score: Option<f64>,

    /// Maximum images for automatic sets.
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde(default)]
    pub image_count: i64,

    pub status: SampleSetStatus,

    /// Download location of the last package, once packaged.
    #[serde(default)]
    pub package_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AcquireType {
    Manual,
    Auto,
}

impl AcquireType {
    pub const ALL: [&'static str; 2] = ["manual", "auto"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AcquireType::Manual => "manual",
            AcquireType::Auto => "auto",
        }
    }
}

impl std::fmt::Display for AcquireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SampleSetStatus {
    Draft,
    Packaging,
    Packaged,
    Failed,
}

impl std::fmt::Display for SampleSetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SampleSetStatus::Draft => "draft",
                SampleSetStatus::Packaging => "packaging",
                SampleSetStatus::Packaged => "packaged",
                SampleSetStatus::Failed => "failed",
            }
        )
    }
}

impl Resource for SampleSet {
    type Id = SampleSetID;
    const PATH: &'static str = "/sample-sets";
    const LABEL: &'static str = "sample set";
    const LIST_IS_PARTIAL: bool = true;

    fn id(&self) -> SampleSetID {
        self.id
    }
}

impl Trackable for SampleSet {
    const ACTIONS: &'static [&'static str] = &["package"];

    fn status_label(&self) -> String {
        self.status.to_string()
    }

    fn run_state(&self) -> RunState {
        match self.status {
            SampleSetStatus::Draft => RunState::Pending,
            SampleSetStatus::Packaging => RunState::Running,
            SampleSetStatus::Packaged => RunState::Succeeded,
            SampleSetStatus::Failed => RunState::Failed,
        }
    }
}
