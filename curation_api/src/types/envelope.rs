use serde::{Deserialize, Serialize};

/// Envelope `code` that marks success.
pub const SUCCESS_CODE: i64 = 200;

/// Uniform wrapper around every backend response.
///
/// A `code` other than [`SUCCESS_CODE`] is an application-level rejection
/// (duplicate name, invalid state, ...). It is not a transport failure and
/// arrives with HTTP 200.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// One page of a list endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items, at least 1.
    pub fn total_pages(&self) -> i64 {
        total_pages(self.total, self.page_size)
    }

    /// `list.len() <= page_size`, and only the last page may overshoot `total`.
    pub fn is_consistent(&self) -> bool {
        let len = self.list.len() as i64;
        if self.page_size > 0 && len > self.page_size {
            return false;
        }
        self.page.saturating_mul(self.page_size) <= self.total || self.page >= self.total_pages()
    }
}

pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total <= 0 {
        return 1;
    }
    (total - 1) / page_size + 1
}

/// Body of the bulk endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IdSet<Id> {
    pub ids: Vec<Id>,
}
