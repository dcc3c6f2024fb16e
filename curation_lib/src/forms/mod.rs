//! Drafts for every editable resource.

use crate::validation::{sanitize_text, FieldValue};

/// Declares a draft's field enum with its wire names.
macro_rules! draft_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace('-', "_");
                $name::ALL
                    .iter()
                    .find(|field| field.as_str() == wanted)
                    .copied()
                    .ok_or_else(|| format!("unknown field '{}'", s))
            }
        }
    };
}

mod cookie;
mod crawl_task;
mod feature;
mod sample_set;
mod style;

pub use cookie::{CookieDraft, CookieField, CookiePayload};
pub use crawl_task::{CrawlTaskDraft, CrawlTaskField, CrawlTaskPayload, TargetDraft};
pub use feature::{FeatureDraft, FeatureField, FeaturePayload};
pub use sample_set::{AcquireDraft, AcquirePayload, SampleSetDraft, SampleSetField, SampleSetPayload};
pub use style::{StyleDefinitionDraft, StyleField, StylePayload};

/// Sanitized optional text.
fn text(value: &FieldValue, max_len: usize) -> Result<Option<String>, String> {
    match value.as_text() {
        Some(raw) => sanitize_text(&raw, max_len),
        None => Ok(None),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
