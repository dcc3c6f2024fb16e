//! The [`Resource`] trait tying a schema to its REST collection.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A backend-managed entity exposed through list/create/update/delete endpoints.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier type. Used in paths, so `Display` must yield the path segment.
    type Id: Clone
        + Ord
        + Hash
        + Debug
        + Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Collection path relative to the API base, e.g. `/cookies`.
    const PATH: &'static str;

    /// Human-readable singular name used in notices.
    const LABEL: &'static str;

    /// Whether list rows omit fields (sensitive or heavy) that only the
    /// detail endpoint returns. Edit forms re-fetch the detail when set.
    const LIST_IS_PARTIAL: bool = false;

    fn id(&self) -> Self::Id;
}

/// Lifecycle of a server-side long-running action as seen by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl RunState {
    /// Succeeded and Failed never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RunState::Pending => "pending",
                RunState::Running => "running",
                RunState::Succeeded => "succeeded",
                RunState::Failed => "failed",
            }
        )
    }
}

/// A resource carrying a status field that long-running actions update.
pub trait Trackable: Resource {
    /// Raw status label as sent by the backend, for display.
    fn status_label(&self) -> String;

    /// The status mapped onto the action lifecycle.
    fn run_state(&self) -> RunState;

    /// Action names accepted by `POST {PATH}/{id}/{action}`.
    const ACTIONS: &'static [&'static str];
}

/// Joins ids into the comma-separated form the backend stores.
pub fn encode_id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a comma-separated id string, skipping blank segments.
pub fn decode_id_list(raw: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<i64>)
        .collect()
}
