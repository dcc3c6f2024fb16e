//! Field values, validation rules and input sanitizing shared by all drafts.

use std::collections::BTreeMap;
use std::fmt::Display;

use curation_api::types::decode_id_list;

use crate::error::ConsoleError;

pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_TEXT_LENGTH: usize = 2000;
pub const MAX_PAGE_SIZE: i64 = 200;

/// A loosely typed value entering a draft field.
///
/// Drafts convert it into their strongly typed fields in `Draft::set`;
/// text is accepted wherever a number, flag or list is expected.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    /// Empty, blank text and empty lists all count as "absent" for `Required`.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn from_option<T: Into<FieldValue>>(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }

    pub fn as_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_string())
    }

    pub fn as_i64(&self) -> Result<Option<i64>, String> {
        match self {
            v if v.is_empty() => Ok(None),
            FieldValue::Int(i) => Ok(Some(*i)),
            FieldValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| format!("'{}' is not a whole number", s)),
            other => Err(format!("'{}' is not a whole number", other)),
        }
    }

    pub fn as_f64(&self) -> Result<Option<f64>, String> {
        match self {
            v if v.is_empty() => Ok(None),
            FieldValue::Float(f) => Ok(Some(*f)),
            FieldValue::Int(i) => Ok(Some(*i as f64)),
            FieldValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("'{}' is not a number", s)),
            other => Err(format!("'{}' is not a number", other)),
        }
    }

    pub fn as_bool(&self) -> Result<Option<bool>, String> {
        match self {
            v if v.is_empty() => Ok(None),
            FieldValue::Bool(b) => Ok(Some(*b)),
            FieldValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(Some(true)),
                "false" | "no" | "0" | "off" => Ok(Some(false)),
                _ => Err(format!("'{}' is not true or false", s)),
            },
            other => Err(format!("'{}' is not true or false", other)),
        }
    }

    /// Accepts a list, a comma-separated string or a single integer.
    pub fn as_id_list(&self) -> Result<Vec<i64>, String> {
        match self {
            v if v.is_empty() => Ok(Vec::new()),
            FieldValue::Int(i) => Ok(vec![*i]),
            FieldValue::Text(s) => {
                decode_id_list(s).map_err(|_| format!("'{}' is not a list of ids", s))
            }
            FieldValue::List(items) => items
                .iter()
                .map(|item| {
                    item.trim()
                        .parse::<i64>()
                        .map_err(|_| format!("'{}' is not an id", item))
                })
                .collect(),
            other => Err(format!("'{}' is not a list of ids", other)),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<i64>> for FieldValue {
    fn from(value: Vec<i64>) -> Self {
        FieldValue::List(value.iter().map(|v| v.to_string()).collect())
    }
}

/// A rule over one field. Every rule except `Required` passes on empty values.
#[derive(Clone, Debug)]
pub enum Rule<F> {
    Required(F),
    MaxLength(F, usize),
    Pattern {
        field: F,
        pattern: &'static str,
        message: &'static str,
    },
    Range {
        field: F,
        min: i64,
        max: i64,
    },
    Custom {
        field: F,
        check: fn(&FieldValue) -> Option<String>,
    },
}

impl<F: Copy> Rule<F> {
    pub fn field(&self) -> F {
        match self {
            Rule::Required(field)
            | Rule::MaxLength(field, _)
            | Rule::Pattern { field, .. }
            | Rule::Range { field, .. }
            | Rule::Custom { field, .. } => *field,
        }
    }

    /// The failure message, or `None` when `value` passes.
    pub fn check(&self, value: &FieldValue) -> Option<String> {
        if let Rule::Required(_) = self {
            return value.is_empty().then(|| "is required".to_string());
        }
        if value.is_empty() {
            return None;
        }
        match self {
            Rule::Required(_) => None,
            Rule::MaxLength(_, max) => {
                let len = value.to_string().chars().count();
                (len > *max).then(|| format!("must be at most {} characters", max))
            }
            Rule::Pattern {
                pattern, message, ..
            } => match regex::Regex::new(pattern) {
                Ok(re) if re.is_match(&value.to_string()) => None,
                Ok(_) => Some(message.to_string()),
                Err(e) => {
                    tracing::error!("Invalid validation pattern {}: {}", pattern, e);
                    Some(message.to_string())
                }
            },
            Rule::Range { min, max, .. } => match value.as_i64() {
                Ok(Some(n)) if n < *min || n > *max => {
                    Some(format!("must be between {} and {}", min, max))
                }
                Ok(_) => None,
                Err(msg) => Some(msg),
            },
            Rule::Custom { check, .. } => check(value),
        }
    }
}

/// Field name to message. Only the first failure per field is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless the field already has an error.
    pub fn add(&mut self, field: impl Display, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn remove(&mut self, field: impl Display) {
        self.errors.remove(&field.to_string());
    }

    pub fn get(&self, field: impl Display) -> Option<&str> {
        self.errors.get(&field.to_string()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, msg)| format!("{} {}", field, msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Runs `rules` against the values returned by `value_of`.
pub fn validate<F, V>(rules: &[Rule<F>], value_of: V) -> ValidationErrors
where
    F: Copy + Display,
    V: Fn(F) -> FieldValue,
{
    let mut errors = ValidationErrors::new();
    for rule in rules {
        let field = rule.field();
        if errors.get(field).is_some() {
            continue;
        }
        if let Some(message) = rule.check(&value_of(field)) {
            errors.add(field, message);
        }
    }
    errors
}

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a character-count limit. Blank input yields `None`.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<Option<String>, String> {
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.chars().count() > max_len {
        return Err(format!("must be at most {} characters", max_len));
    }
    if sanitized.is_empty() {
        return Ok(None);
    }
    Ok(Some(sanitized))
}

/// Validate page number (must be >= 1).
pub fn validate_page(page: i64) -> Result<i64, ConsoleError> {
    if page < 1 {
        return Err(ConsoleError::InvalidInput(
            "page must be >= 1".to_string(),
        ));
    }
    Ok(page)
}

/// Validate page size (must be 1..=MAX_PAGE_SIZE).
pub fn validate_page_size(page_size: i64) -> Result<i64, ConsoleError> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ConsoleError::InvalidInput(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(page_size)
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
