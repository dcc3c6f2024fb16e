use curation_api::{Filters, ListQuery, Query};
use url::Url;

fn base() -> Url {
    Url::parse("https://example.com/api/v1/crawl-tasks").unwrap()
}

#[test]
fn default_query_only_sends_page() {
    let url = ListQuery::default().add_to_url(&base());
    assert_eq!(url.query(), Some("page=1"));
}

#[test]
fn page_size_is_snake_case() {
    let url = ListQuery::default()
        .with_page(2)
        .with_page_size(50)
        .add_to_url(&base());
    assert_eq!(url.query(), Some("page=2&page_size=50"));
}

#[test]
fn undefined_filters_are_dropped() {
    let filters = Filters::new()
        .with("status", "running")
        .without("platform")
        .with("cookie_id", 11);
    let url = ListQuery::default().with_filters(&filters).add_to_url(&base());
    let query = url.query().unwrap();
    assert!(query.contains("status=running"));
    assert!(query.contains("cookie_id=11"));
    assert!(!query.contains("platform"));
    assert!(!query.contains("undefined"));
}

#[test]
fn filters_are_url_encoded() {
    let url = ListQuery::default()
        .with_filter("keyword", "red & gold")
        .add_to_url(&base());
    assert_eq!(url.query(), Some("page=1&keyword=red+%26+gold"));
}

#[test]
fn numeric_and_bool_filters() {
    let url = ListQuery::default()
        .with_filter("min_score", 0.5)
        .with_filter("enabled", false)
        .add_to_url(&base());
    assert_eq!(url.query(), Some("page=1&enabled=false&min_score=0.5"));
}
