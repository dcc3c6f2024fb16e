//! CLI subcommand implementations.

pub mod features;
pub mod resource;
pub mod sample_sets;

use std::sync::Arc;

use anyhow::{bail, Result};
use curation_lib::types::{Envelope, Resource};
use curation_lib::{
    Client, ConsoleConfig, ConsoleError, FilterValue, Filters, Notice, Notifier,
};

/// Shared handles every command needs.
pub struct Context {
    pub client: Arc<Client>,
    pub notifier: Arc<dyn Notifier>,
    pub config: ConsoleConfig,
}

impl Context {
    /// Sends `error` as a notice and hands it back for propagation.
    pub fn report(&self, error: ConsoleError) -> anyhow::Error {
        self.notifier.notify(Notice::error(error.user_message()));
        error.into()
    }

    /// Fetches one full record from the detail endpoint.
    pub async fn fetch<R: Resource>(&self, id: &R::Id) -> Result<R> {
        let error = match self.client.detail::<R>(id).await {
            Ok(Envelope {
                code: 200,
                data: Some(record),
                ..
            }) => return Ok(record),
            Ok(Envelope { code: 200, .. }) => bail!("{} {} not found", R::LABEL, id),
            Ok(env) => ConsoleError::Application {
                code: env.code,
                message: env.message,
            },
            Err(e) => ConsoleError::Api(e),
        };
        Err(self.report(error))
    }
}

/// A failure the notifier has already shown; only the exit status is left.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failure already reported")
    }
}

impl std::error::Error for Reported {}

/// Whether the notifier has already shown this error to the user.
pub fn already_reported(error: &anyhow::Error) -> bool {
    if error.is::<Reported>() {
        return true;
    }
    matches!(
        error.downcast_ref::<ConsoleError>(),
        Some(
            ConsoleError::Api(_)
                | ConsoleError::Application { .. }
                | ConsoleError::NothingSelected
        )
    )
}

/// Splits a `key=value` argument.
pub fn parse_pair(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Expected key=value, got '{}'", raw),
    }
}

/// Builds list filters from `key=value` arguments. An empty value unsets the key.
pub fn parse_filters(pairs: &[String]) -> Result<Filters> {
    let mut filters = Filters::new();
    for raw in pairs {
        let (key, value) = parse_pair(raw)?;
        if value.is_empty() {
            filters.unset(key);
        } else {
            filters.set(key, filter_value(value));
        }
    }
    Ok(filters)
}

fn filter_value(raw: &str) -> FilterValue {
    if let Ok(i) = raw.parse::<i64>() {
        return FilterValue::Int(i);
    }
    match raw {
        "true" => FilterValue::Bool(true),
        "false" => FilterValue::Bool(false),
        _ => FilterValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("status=active").unwrap(), ("status", "active"));
        assert_eq!(parse_pair("url=https://x.io/?a=b").unwrap(), ("url", "https://x.io/?a=b"));
        assert_eq!(parse_pair("remark=").unwrap(), ("remark", ""));
        assert!(parse_pair("status").is_err());
        assert!(parse_pair("=active").is_err());
    }

    #[test]
    fn test_parse_filters_types_values() {
        let filters = parse_filters(&[
            "status=active".to_string(),
            "parent_id=4".to_string(),
            "enabled=true".to_string(),
        ])
        .unwrap();
        assert_eq!(filters.get("status"), Some(&FilterValue::Text("active".into())));
        assert_eq!(filters.get("parent_id"), Some(&FilterValue::Int(4)));
        assert_eq!(filters.get("enabled"), Some(&FilterValue::Bool(true)));
    }

    #[test]
    fn test_parse_filters_empty_value_unsets() {
        let filters = parse_filters(&["category=".to_string()]).unwrap();
        assert!(filters.is_empty());
        assert_eq!(filters.get("category"), None);
    }

    #[test]
    fn test_already_reported() {
        let application: anyhow::Error = ConsoleError::Application {
            code: 409,
            message: "exists".into(),
        }
        .into();
        assert!(already_reported(&application));
        assert!(already_reported(&Reported.into()));

        let invalid: anyhow::Error = ConsoleError::InvalidInput("bad".into()).into();
        assert!(!already_reported(&invalid));
        assert!(!already_reported(&anyhow::anyhow!("plain")));
    }
}
