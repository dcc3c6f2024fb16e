//! Typed client for the curation backend REST API.
//!
//! Every endpoint answers with an [`types::Envelope`]; list endpoints wrap a
//! [`types::Page`]. Resources describe their collection through
//! [`types::Resource`].

mod client;
mod errors;
mod query;
pub mod types;
pub use self::client::{Client, RequestBody, UploadForm, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::query::{FilterValue, Filters, ListQuery, Query, QueryCommon};
pub use reqwest::Method;
