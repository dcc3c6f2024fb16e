//! Library layer for the curation console: list controllers, form sessions
//! and long-running action tracking on top of `curation_api`.
//!
//! Every screen of the console is the same loop: load a page, edit a draft,
//! submit, and for slow server work, poll until the backend reports a result.

pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod forms;
pub mod notice;
pub mod taxonomy;
pub mod tracker;
pub mod validation;

pub use curation_api;
pub use curation_api::types;
pub use curation_api::{Client, FilterValue, Filters, ListQuery, Query, UploadForm};

pub use config::{ConfigError, ConsoleConfig};
pub use controller::{ControllerState, LoadOutcome, Pagination, ResourceController};
pub use error::ConsoleError;
pub use form::{Draft, FormMode, FormSession, SaveKind, Saved};
pub use notice::{Notice, NoticeLevel, NoticeLog, Notifier, TracingNotifier};
pub use tracker::{ActionHandle, ActionOutcome, AsyncAction, LongRunningActionTracker, TrackerConfig};
pub use validation::{FieldValue, Rule, ValidationErrors};
