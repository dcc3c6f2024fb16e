//! Crawl task definitions and their run status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CookieID, Platform, Resource, RunState, Trackable};

pub type CrawlTaskID = i64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CrawlTask {
    pub id: CrawlTaskID,

    pub name: String,

    pub platform: Platform,

    /// What to crawl. Serialized flat with a `mode` discriminator.
    #[serde(flatten)]
    pub target: CrawlTarget,

    /// Login session used for platforms that need one.
    #[serde(default)]
    pub cookie_id: Option<CookieID>,

    /// Upper bound on images collected per run. `None` uses the backend default.
    #[serde(default)]
    pub max_items: Option<i64>,

    pub status: TaskStatus,

    /// Images collected by the most recent run.
    #[serde(default)]
    pub collected_count: i64,

    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// The crawl target, one variant per mode.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CrawlTarget {
    Keyword { keyword: String },
    Account { account_url: String },
}

impl CrawlTarget {
    pub fn mode(&self) -> &'static str {
        match self {
            CrawlTarget::Keyword { .. } => "keyword",
            CrawlTarget::Account { .. } => "account",
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            CrawlTarget::Keyword { keyword } => keyword,
            CrawlTarget::Account { account_url } => account_url,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TaskStatus::Pending => "pending",
                TaskStatus::Running => "running",
                TaskStatus::Completed => "completed",
                TaskStatus::Failed => "failed",
                TaskStatus::Stopped => "stopped",
            }
        )
    }
}

impl Resource for CrawlTask {
    type Id = CrawlTaskID;
    const PATH: &'static str = "/crawl-tasks";
    const LABEL: &'static str = "crawl task";

    fn id(&self) -> CrawlTaskID {
        self.id
    }
}

impl Trackable for CrawlTask {
    const ACTIONS: &'static [&'static str] = &["execute", "crawl"];

    fn status_label(&self) -> String {
        self.status.to_string()
    }

    fn run_state(&self) -> RunState {
        match self.status {
            TaskStatus::Pending => RunState::Pending,
            TaskStatus::Running => RunState::Running,
            TaskStatus::Completed => RunState::Succeeded,
            TaskStatus::Failed | TaskStatus::Stopped => RunState::Failed,
        }
    }
}
