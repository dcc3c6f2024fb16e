#![allow(dead_code)]

use std::sync::Arc;

use curation_lib::{Client, NoticeLevel, NoticeLog, Notifier};
use serde_json::{json, Value};
use wiremock::MockServer;

pub fn client_for(server: &MockServer) -> Arc<Client> {
    Arc::new(Client::with_base_url(&format!("{}/api/v1", server.uri())).unwrap())
}

pub fn notices() -> (Arc<NoticeLog>, Arc<dyn Notifier>) {
    let log = Arc::new(NoticeLog::new());
    let notifier: Arc<dyn Notifier> = log.clone();
    (log, notifier)
}

pub fn levels(log: &NoticeLog) -> Vec<NoticeLevel> {
    log.notices().iter().map(|n| n.level).collect()
}

pub fn ok(data: Value) -> Value {
    json!({"code": 200, "message": "ok", "data": data})
}

pub fn rejected(code: i64, message: &str) -> Value {
    json!({"code": code, "message": message, "data": null})
}

pub fn page(list: Vec<Value>, page: i64, page_size: i64, total: i64) -> Value {
    ok(json!({"list": list, "page": page, "page_size": page_size, "total": total}))
}

pub fn feature(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("feature {}", id),
        "category": "style",
        "created_at": "2026-01-01T00:00:00Z"
    })
}

pub fn features(ids: std::ops::RangeInclusive<i64>) -> Vec<Value> {
    ids.map(feature).collect()
}

pub fn crawl_task(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "name": "sunset keywords",
        "platform": "xiaohongshu",
        "mode": "keyword",
        "keyword": "sunset film",
        "cookie_id": 11,
        "status": status,
        "collected_count": 0,
        "created_at": "2026-09-01T00:00:00Z"
    })
}
