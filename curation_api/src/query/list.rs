use url::Url;

use super::{
    common::QueryCommon,
    filters::{FilterValue, Filters},
    Query,
};

/// Query for any list endpoint: pagination plus resource-specific filters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub common: QueryCommon,
    pub filters: Filters,
}

impl Query for ListQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let url = self.common.add_to_url(url);
        self.filters.add_to_url(&url)
    }
}

impl ListQuery {
    pub fn with_filter(mut self, key: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.set(key, value);
        self
    }

    pub fn with_filters(mut self, filters: &Filters) -> Self {
        self.filters.merge(filters);
        self
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::query::{Filters, ListQuery, Query};

    #[test]
    fn test_list_query() {
        let url = Url::parse("https://example.com/api/cookies").unwrap();

        insta::assert_snapshot!(ListQuery::default()
            .with_page(3)
            .with_page_size(20)
            .with_filter("platform", "weibo")
            .with_filter("enabled", true)
            .add_to_url(&url)
            .to_string(), @"https://example.com/api/cookies?page=3&page_size=20&enabled=true&platform=weibo");

        insta::assert_snapshot!(ListQuery::default()
            .with_filters(&Filters::new().with("keyword", "red sunset").without("status"))
            .add_to_url(&url)
            .to_string(), @"https://example.com/api/cookies?page=1&keyword=red+sunset");
    }
}
