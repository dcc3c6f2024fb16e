//! Feature taxonomy entries (styles, scenes, subjects, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

pub type FeatureID = i64;

/// Categories the taxonomy is split into.
pub const FEATURE_CATEGORIES: [&str; 5] = ["style", "scene", "subject", "color", "composition"];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: FeatureID,

    pub name: String,

    /// One of [`FEATURE_CATEGORIES`].
    pub category: String,

    /// Parent feature within the same category. `None` for roots.
    #[serde(default)]
    pub parent_id: Option<FeatureID>,

    #[serde(default)]
    pub description: Option<String>,

    /// Number of tagged samples.
    #[serde(default)]
    pub sample_count: i64,

    pub created_at: DateTime<Utc>,
}

impl Resource for Feature {
    type Id = FeatureID;
    const PATH: &'static str = "/features";
    const LABEL: &'static str = "feature";

    fn id(&self) -> FeatureID {
        self.id
    }
}
