//! Resource-specific list filters.

use std::collections::BTreeMap;

use url::Url;

/// A scalar filter value.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "{}", s),
            FilterValue::Int(i) => write!(f, "{}", i),
            FilterValue::Float(v) => write!(f, "{}", v),
            FilterValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// Filter key to scalar-or-undefined.
///
/// An undefined entry (`None`) is kept in the map so a patch can clear a
/// previously set key, but it is never written to the query string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    entries: BTreeMap<String, Option<FilterValue>>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Marks `key` as undefined. Merging this into another set removes the key there.
    pub fn without(mut self, key: &str) -> Self {
        self.unset(key);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<FilterValue>) {
        self.entries.insert(key.to_string(), Some(value.into()));
    }

    pub fn unset(&mut self, key: &str) {
        self.entries.insert(key.to_string(), None);
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// Applies `patch` on top of `self`: defined values overwrite, undefined ones remove.
    pub fn merge(&mut self, patch: &Filters) {
        for (key, value) in patch.entries.iter() {
            match value {
                Some(v) => {
                    self.entries.insert(key.clone(), Some(v.clone()));
                }
                None => {
                    self.entries.remove(key);
                }
            }
        }
    }

    /// Defined entries in key order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        for (key, value) in self.present() {
            url.query_pairs_mut().append_pair(key, &value.to_string());
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_and_removes() {
        let mut filters = Filters::new().with("status", "active").with("platform", "weibo");
        filters.merge(&Filters::new().with("status", "expired").without("platform"));

        assert_eq!(
            filters.get("status"),
            Some(&FilterValue::Text("expired".to_string()))
        );
        assert_eq!(filters.get("platform"), None);
        assert_eq!(filters.present().count(), 1);
    }

    #[test]
    fn undefined_entries_are_not_serialized() {
        let url = Url::parse("https://example.com/cookies").unwrap();
        let filters = Filters::new().with("enabled", true).without("name");
        assert_eq!(
            filters.add_to_url(&url).as_str(),
            "https://example.com/cookies?enabled=true"
        );
        assert!(!filters.is_empty());
        assert!(Filters::new().without("x").is_empty());
    }
}
