//! The [`Query`] trait and the paging parameters every list endpoint takes.

use url::Url;

/// A list request that can render itself onto an endpoint URL.
pub trait Query {
    fn add_to_url(&self, url: &Url) -> Url;

    fn get_common(&mut self) -> &mut QueryCommon;

    /// 1-indexed page to fetch.
    fn with_page(mut self, page: i64) -> Self
    where
        Self: Sized,
    {
        self.get_common().page = page;
        self
    }

    fn with_page_size(mut self, page_size: i64) -> Self
    where
        Self: Sized,
    {
        self.get_common().page_size = Some(page_size);
        self
    }
}

/// `page` is always sent; `page_size` only when set, so the backend default applies otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryCommon {
    pub page: i64,
    pub page_size: Option<i64>,
}

impl Default for QueryCommon {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
        }
    }
}

impl QueryCommon {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string())];
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        pairs
    }

    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut().extend_pairs(self.pairs());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_omitted_until_set() {
        let base = Url::parse("http://localhost/api/v1/cookies").unwrap();
        let mut common = QueryCommon::default();
        assert_eq!(common.add_to_url(&base).query(), Some("page=1"));

        common.page = 4;
        common.page_size = Some(50);
        assert_eq!(common.add_to_url(&base).query(), Some("page=4&page_size=50"));
    }
}
