mod common;

use std::time::Duration;

use common::{client_for, feature, features, levels, notices, ok, page, rejected};
use curation_lib::types::Feature;
use curation_lib::{ConsoleError, Filters, LoadOutcome, NoticeLevel, ResourceController};
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn list_mock(server: &MockServer, page_no: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", page_no))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn load_replaces_items_and_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(1..=10), 1, 10, 35)))
        .expect(1)
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    let outcome = controller.load(1, 10).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied);
    let state = controller.snapshot();
    assert_eq!(state.items.len(), 10);
    assert_eq!(state.pagination.total, 35);
    assert_eq!(state.pagination.total_pages(), 4);
    assert!(!state.loading);
    assert!(log.notices().is_empty());
}

#[tokio::test]
async fn late_response_from_superseded_load_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(features(1..=2), 1, 2, 4))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    list_mock(&server, "2", page(features(3..=4), 2, 2, 4)).await;

    let (_log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    let (first, second) = tokio::join!(controller.load(1, 2), controller.load(2, 2));

    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);
    let ids: Vec<i64> = controller.items().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![3, 4]);
    assert_eq!(controller.pagination().current, 2);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn early_response_from_superseded_load_is_discarded() {
    let server = MockServer::start().await;
    list_mock(&server, "1", page(features(1..=2), 1, 2, 4)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(features(3..=4), 2, 2, 4))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let (_log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    let (first, second) = tokio::join!(controller.load(1, 2), controller.load(2, 2));

    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);
    assert_eq!(controller.items()[0].id, 3);
}

#[tokio::test]
async fn filter_change_returns_to_first_page() {
    let server = MockServer::start().await;
    list_mock(&server, "3", page(features(41..=60), 3, 20, 100)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "1"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(1..=5), 1, 20, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let (_log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.set_page(3).await.unwrap();
    controller.select(41);
    assert_eq!(controller.pagination().current, 3);

    controller
        .set_filters(&Filters::new().with("status", "active"))
        .await
        .unwrap();

    assert_eq!(controller.pagination().current, 1);
    assert!(controller.selection().is_empty());
    assert_eq!(controller.items().len(), 5);
}
#[tokio::test]
async fn seeded_filters_apply_to_first_load() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "3"))
        .and(query_param("category", "color"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(41..=42), 3, 20, 42)))
        .expect(1)
        .mount(&server)
        .await;

    let (_log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier)
        .with_filters(&Filters::new().with("category", "color"));
    controller.load(3, 20).await.unwrap();

    assert_eq!(controller.items().len(), 2);
    assert_eq!(controller.pagination().current, 3);
}

#[tokio::test]
async fn undefined_filter_removes_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("category", "scene"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 1, 20, 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(1..=3), 1, 20, 3)))
        .mount(&server)
        .await;

    let (_log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller
        .set_filters(&Filters::new().with("category", "scene"))
        .await
        .unwrap();
    controller
        .set_filters(&Filters::new().without("category"))
        .await
        .unwrap();

    assert!(controller.filters().is_empty());
    assert_eq!(controller.items().len(), 3);
    let requests = server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.url.query(), Some("page=1&page_size=20"));
}

#[tokio::test]
async fn failed_load_keeps_previous_items() {
    let server = MockServer::start().await;
    list_mock(&server, "1", page(features(1..=3), 1, 3, 9)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"code": 500, "message": "index rebuilding", "data": null})),
        )
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.load(1, 3).await.unwrap();
    let err = controller.set_page(2).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Api(_)));
    assert_eq!(controller.items().len(), 3);
    assert_eq!(controller.pagination().current, 1);
    assert!(!controller.is_loading());
    let notices = log.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "index rebuilding");
}

#[tokio::test]
async fn rejected_list_surfaces_server_message() {
    let server = MockServer::start().await;
    list_mock(&server, "1", rejected(403, "no access to features")).await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    let err = controller.load(1, 20).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Application { code: 403, .. }));
    assert_eq!(log.notices()[0].message, "no access to features");
    assert!(controller.items().is_empty());
}

#[tokio::test]
async fn refresh_failure_is_quiet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    assert!(controller.refresh().await.is_err());
    assert!(log.notices().is_empty());
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn empty_bulk_remove_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    let err = controller.bulk_remove(&[]).await.unwrap_err();
    assert!(matches!(err, ConsoleError::NothingSelected));
    let err = controller.bulk_remove_selected().await.unwrap_err();
    assert!(matches!(err, ConsoleError::NothingSelected));

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(levels(&log), vec![NoticeLevel::Warning, NoticeLevel::Warning]);
}

#[tokio::test]
async fn deleting_last_item_on_page_falls_back_one_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![feature(21)], 2, 20, 21)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    list_mock(&server, "2", page(vec![], 2, 20, 20)).await;
    list_mock(&server, "1", page(features(1..=20), 1, 20, 20)).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/features/21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.load(2, 20).await.unwrap();
    assert_eq!(controller.items().len(), 1);

    controller.remove(&21).await.unwrap();

    let pagination = controller.pagination();
    assert_eq!(pagination.current, 1);
    assert_eq!(pagination.total, 20);
    assert_eq!(controller.items().len(), 20);
    assert_eq!(levels(&log), vec![NoticeLevel::Success]);
}

#[tokio::test]
async fn failed_delete_does_not_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(1..=2), 1, 20, 2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/features/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(rejected(409, "feature has children")),
        )
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.reload().await.unwrap();
    let err = controller.remove(&2).await.unwrap_err();

    assert_eq!(err.user_message(), "feature has children");
    assert_eq!(controller.items().len(), 2);
    assert_eq!(log.notices()[0].message, "feature has children");
}

#[tokio::test]
async fn bulk_remove_sends_one_request_and_clears_selection() {
    let server = MockServer::start().await;
    list_mock(&server, "1", page(features(1..=5), 1, 20, 5)).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/features/batch"))
        .and(body_json(json!({"ids": [2, 4]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({"deleted": 2}))))
        .expect(1)
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.reload().await.unwrap();
    controller.select(4);
    assert!(controller.toggle(2));

    controller.bulk_remove_selected().await.unwrap();

    assert!(controller.selection().is_empty());
    assert_eq!(log.notices()[0].message, "Deleted 2 feature(s)");
}

#[tokio::test]
async fn bulk_restore_posts_ids() {
    let server = MockServer::start().await;
    list_mock(&server, "1", page(features(1..=2), 1, 20, 2)).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/features/batch-restore"))
        .and(body_json(json!({"ids": [8, 9]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.bulk_restore(&[8, 9]).await.unwrap();
    assert_eq!(levels(&log), vec![NoticeLevel::Success]);
    assert_eq!(controller.items().len(), 2);
}

#[tokio::test]
async fn selection_changes_never_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(1..=3), 1, 20, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let (_log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.reload().await.unwrap();

    controller.select_page();
    assert_eq!(controller.selection().len(), 3);
    controller.select(2);
    assert_eq!(controller.selection().len(), 3);
    assert!(!controller.toggle(1));
    controller.deselect(&3);
    assert!(controller.is_selected(&2));
    assert!(!controller.is_selected(&1));
    controller.clear_selection();
    assert!(controller.selection().is_empty());
}

#[tokio::test]
async fn page_size_change_resets_to_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(1..=3), 1, 50, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let (_log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.set_page_size(50).await.unwrap();
    assert_eq!(controller.pagination().page_size, 50);

    assert!(matches!(
        controller.set_page_size(0).await,
        Err(ConsoleError::InvalidInput(_))
    ));
    assert!(matches!(
        controller.set_page(0).await,
        Err(ConsoleError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn background_refresh_follows_pending_navigation() {
    let server = MockServer::start().await;
    list_mock(&server, "1", page(features(1..=20), 1, 20, 60)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(features(41..=60), 3, 20, 60))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.load(1, 20).await.unwrap();

    let (navigation, refresh) = tokio::join!(controller.set_page(3), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.refresh().await
    });

    assert_eq!(navigation.unwrap(), LoadOutcome::Superseded);
    assert_eq!(refresh.unwrap(), LoadOutcome::Applied);
    assert_eq!(controller.pagination().current, 3);
    assert_eq!(controller.items()[0].id, 41);
    assert!(!controller.is_loading());
    assert!(log.notices().is_empty());
}

#[tokio::test]
async fn failed_reload_after_delete_keeps_single_success_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(features(1..=2), 1, 20, 2)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/features"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/features/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let (log, notifier) = notices();
    let controller = ResourceController::<Feature>::new(client_for(&server), notifier);
    controller.reload().await.unwrap();

    let outcome = controller.remove(&2).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Stale);
    assert_eq!(levels(&log), vec![NoticeLevel::Success]);
    assert_eq!(log.notices()[0].message, "Deleted feature 2");
    assert_eq!(controller.items().len(), 2);
    assert!(!controller.is_loading());
}
