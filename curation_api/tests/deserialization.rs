use curation_api::types::{
    AcquireType, CalcStatus, Cookie, CookieStatus, CrawlTarget, CrawlTask, Envelope, Feature, Page,
    Platform, Resource, RunState, SampleSet, StyleDefinition, TaskStatus, Trackable,
};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_cookies_page() {
    let json = load_fixture("cookies_page.json");
    let resp: Envelope<Page<Cookie>> = serde_json::from_str(&json).unwrap();
    assert!(resp.is_success());

    let page = resp.data.unwrap();
    assert_eq!(page.list.len(), 2);
    assert_eq!(page.total, 2);
    assert_eq!(page.page_size, 20);

    let main = &page.list[0];
    assert_eq!(main.id(), 11);
    assert_eq!(main.platform, Platform::Weibo);
    assert_eq!(main.account.as_deref(), Some("curator_01"));
    assert_eq!(main.value, None);
    assert_eq!(main.status, CookieStatus::Active);

    let backup = &page.list[1];
    assert_eq!(backup.status, CookieStatus::Expired);
    assert_eq!(backup.run_state(), RunState::Failed);
    assert!(backup.updated_at.is_none());
}

#[test]
fn deserialize_cookie_detail_reveals_value() {
    let json = load_fixture("cookie_detail.json");
    let resp: Envelope<Cookie> = serde_json::from_str(&json).unwrap();
    let cookie = resp.data.unwrap();
    assert_eq!(cookie.value.as_deref(), Some("SUB=_2A25abc; SUBP=0033W"));
    assert_eq!(cookie.remark.as_deref(), Some("rotated monthly"));
}

#[test]
fn deserialize_crawl_task_variants() {
    let json = load_fixture("crawl_tasks_page.json");
    let resp: Envelope<Page<CrawlTask>> = serde_json::from_str(&json).unwrap();
    let page = resp.data.unwrap();

    let keyword = &page.list[0];
    assert_eq!(
        keyword.target,
        CrawlTarget::Keyword {
            keyword: "sunset film".to_string()
        }
    );
    assert_eq!(keyword.cookie_id, Some(11));
    assert_eq!(keyword.status, TaskStatus::Running);
    assert_eq!(keyword.run_state(), RunState::Running);

    let account = &page.list[1];
    assert_eq!(account.target.mode(), "account");
    assert_eq!(account.target.describe(), "https://www.pinterest.com/studio/");
    assert_eq!(account.collected_count, 0);
    assert_eq!(account.run_state(), RunState::Succeeded);
}

#[test]
fn crawl_task_serializes_flat_mode() {
    let json = load_fixture("crawl_tasks_page.json");
    let resp: Envelope<Page<CrawlTask>> = serde_json::from_str(&json).unwrap();
    let mut page = resp.data.unwrap();
    let task = page.list.remove(0);

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["mode"], "keyword");
    assert_eq!(value["keyword"], "sunset film");
    assert!(value.get("target").is_none());
}

#[test]
fn deserialize_sample_set_detail() {
    let json = load_fixture("sample_set_detail.json");
    let resp: Envelope<SampleSet> = serde_json::from_str(&json).unwrap();
    let set = resp.data.unwrap();
    assert_eq!(set.acquire_type, AcquireType::Manual);
    assert_eq!(set.image_ids.as_deref(), Some("101,102,103"));
    assert_eq!(set.run_state(), RunState::Succeeded);
    assert_eq!(set.status_label(), "packaged");
}

#[test]
fn deserialize_styles_with_defaults() {
    let json = load_fixture("styles_page.json");
    let resp: Envelope<Page<StyleDefinition>> = serde_json::from_str(&json).unwrap();
    let style = &resp.data.unwrap().list[0];
    assert!(style.enabled);
    assert_eq!(style.description, None);
    assert_eq!(style.calc_status, CalcStatus::Done);
    assert_eq!(style.feature_ids, "1,5,9");
}

#[test]
fn deserialize_features() {
    let json = load_fixture("features_page.json");
    let resp: Envelope<Page<Feature>> = serde_json::from_str(&json).unwrap();
    let page = resp.data.unwrap();
    assert_eq!(page.list.len(), 3);
    assert_eq!(page.list[1].parent_id, Some(1));
    assert_eq!(page.list[1].sample_count, 40);
    assert_eq!(page.list[2].description.as_deref(), Some("low sun"));
}

#[test]
fn deserialize_rejection() {
    let json = load_fixture("rejected.json");
    let resp: Envelope<Cookie> = serde_json::from_str(&json).unwrap();
    assert!(!resp.is_success());
    assert_eq!(resp.message, "cookie name already exists");
    assert!(resp.data.is_none());
}

#[test]
fn missing_required_field_is_an_error() {
    let json = r#"{"code": 200, "message": "ok", "data": {"id": 1, "platform": "weibo", "status": "active"}}"#;
    let resp: Result<Envelope<Cookie>, _> = serde_json::from_str(json);
    assert!(resp.is_err());
}

#[test]
fn envelope_round_trip_preserves_data() {
    let json = load_fixture("features_page.json");
    let original: Envelope<Page<Feature>> = serde_json::from_str(&json).unwrap();
    let page = original.data.clone().unwrap();

    let encoded = serde_json::to_string(&Envelope::ok(page.clone())).unwrap();
    let decoded: Envelope<Page<Feature>> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.code, 200);
    assert_eq!(decoded.message, "ok");
    assert_eq!(decoded.data, Some(page));
}

#[test]
fn envelope_round_trip_scalars() {
    for value in [serde_json::json!(0), serde_json::json!("text"), serde_json::json!([1, 2])] {
        let encoded = serde_json::to_string(&Envelope::ok(value.clone())).unwrap();
        let decoded: Envelope<serde_json::Value> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.data, Some(value));
    }
}
