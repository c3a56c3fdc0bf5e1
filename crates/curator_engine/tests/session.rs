use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use curator_core::{
    CollectionError, CollectionId, JobStatus, NotificationKind, Rejection, TransferSelection,
    TIMEOUT_MESSAGE,
};
use curator_engine::{GatewayError, GatewaySettings, Session, SessionError, SessionSettings};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(curator_logging::initialize_for_tests);
}

fn settings() -> SessionSettings {
    SessionSettings {
        favorites_collection: CollectionId::new("fav"),
        poll_interval: Duration::from_millis(10),
        ..SessionSettings::default()
    }
}

fn session_for(server: &MockServer, settings: SessionSettings) -> Session {
    Session::connect(
        GatewaySettings {
            base_url: server.uri(),
            ..GatewaySettings::default()
        },
        settings,
    )
    .expect("valid base url")
}

fn job(status: &str, processed: u64, inserted: u64, skipped: u64) -> Value {
    json!({
        "job_id": "job-1",
        "status": status,
        "total_count": 3,
        "processed_count": processed,
        "inserted_count": inserted,
        "skipped_count": skipped,
        "failed_count": 0
    })
}

/// Collections "all" (three companies, none liked) and "fav", plus the first
/// page of "all".
async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "all", "collection_name": "My List", "total": 3 },
            { "id": "fav", "collection_name": "Liked Companies", "total": 0 },
            { "id": "leads", "collection_name": "leads", "total": 0 }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/all"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "all",
            "collection_name": "My List",
            "companies": [
                { "id": 1, "company_name": "Acme", "liked": false },
                { "id": 2, "company_name": "Globex", "liked": false },
                { "id": 3, "company_name": "Initech", "liked": false }
            ],
            "total": 3
        })))
        .mount(server)
        .await;
}

async fn wait_for_jobs(session: &Session) {
    tokio::time::timeout(Duration::from_secs(5), session.wait_for_jobs())
        .await
        .expect("polling finished in time");
}

#[tokio::test]
async fn loading_collections_opens_the_first_page() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let session = session_for(&server, settings());
    let changes = session.changes();
    session.load_collections().await.expect("load ok");

    let view = session.view();
    assert_eq!(view.collections.len(), 3);
    assert_eq!(view.collection_id, Some(CollectionId::new("all")));
    assert_eq!(view.rows.len(), 3);
    assert_eq!(view.total_pages, 1);
    assert!(!view.loading);
    assert!(changes.has_changed().expect("sender alive"));
    assert!(*changes.borrow() > 0);
}

#[tokio::test]
async fn rejected_favorite_rolls_back() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/favorites/toggle"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server, settings());
    session.load_collections().await.expect("load ok");

    let err = session
        .toggle_favorite(2, true)
        .await
        .expect_err("server refused");
    match err {
        SessionError::Mutation { company_id, source } => {
            assert_eq!(company_id, 2);
            assert_eq!(source.status(), Some(500));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let view = session.view();
    let row = view.rows.iter().find(|r| r.id == 2).expect("row present");
    assert!(!row.liked);
    assert_eq!(view.notifications[0].kind, NotificationKind::Error);
    assert_eq!(session.with_state(|state| state.favorites_in_flight()), 0);
}

#[tokio::test]
async fn confirmed_favorite_sticks() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/favorites/toggle"))
        .and(body_json(json!({
            "favorites_list_id": "fav",
            "company_id": 1,
            "liked": true
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "company_id": 1, "liked": true })),
        )
        .mount(&server)
        .await;

    let session = session_for(&server, settings());
    session.load_collections().await.expect("load ok");
    session.toggle_favorite(1, true).await.expect("toggle ok");

    let view = session.view();
    assert!(view.rows.iter().any(|r| r.id == 1 && r.liked));
    assert!(view.notifications.is_empty());
}

#[tokio::test]
async fn selected_transfer_polls_to_completion_and_refreshes_once() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/transfer"))
        .and(body_json(json!({
            "source_list_id": "all",
            "target_list_id": "fav",
            "selection": { "mode": "ids", "ids": [1, 2, 3] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "job-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/transfer/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("running", 1, 1, 0)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/transfer/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("completed", 3, 2, 1)))
        .mount(&server)
        .await;

    let session = session_for(&server, settings());
    let refreshes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&refreshes);
    session.on_refresh(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    session.load_collections().await.expect("load ok");
    for id in 1..=3 {
        session.toggle_selected(id);
    }
    let job_id = session
        .transfer_selected(CollectionId::new("fav"))
        .await
        .expect("transfer started");
    assert_eq!(job_id.as_str(), "job-1");

    let view = session.view();
    assert_eq!(view.jobs.len(), 1);
    assert_eq!(view.jobs[0].total, 3);
    assert_eq!(view.selected_count, 0);

    wait_for_jobs(&session).await;

    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    let view = session.view();
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].count, 2);
    assert_eq!(view.history[0].target_list, "Liked Companies");
    assert_eq!(view.jobs[0].status, JobStatus::Completed);
    assert_eq!(view.jobs[0].inserted, 2);
    assert!(!view.polling);
}

async fn mount_single_transfer(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/transfer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "job-1" })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn zero_poll_interval_still_polls_to_completion() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_single_transfer(&server).await;
    Mock::given(method("GET"))
        .and(path("/transfer/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("completed", 3, 3, 0)))
        .mount(&server)
        .await;

    let session = session_for(
        &server,
        SessionSettings {
            poll_interval: Duration::ZERO,
            ..settings()
        },
    );
    session.load_collections().await.expect("load ok");
    session.toggle_selected(1);
    session
        .transfer_selected(CollectionId::new("fav"))
        .await
        .expect("transfer started");

    wait_for_jobs(&session).await;

    let view = session.view();
    assert_eq!(view.jobs[0].status, JobStatus::Completed);
    assert!(!view.polling);
}

#[tokio::test]
async fn failed_status_poll_is_retried_without_a_notification() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_single_transfer(&server).await;
    Mock::given(method("GET"))
        .and(path("/transfer/jobs/job-1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/transfer/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("completed", 3, 3, 0)))
        .mount(&server)
        .await;

    let session = session_for(&server, settings());
    session.load_collections().await.expect("load ok");
    session.toggle_selected(1);
    session
        .transfer_selected(CollectionId::new("fav"))
        .await
        .expect("transfer started");

    wait_for_jobs(&session).await;

    let view = session.view();
    assert_eq!(view.jobs[0].status, JobStatus::Completed);
    assert!(view
        .notifications
        .iter()
        .all(|n| n.kind != NotificationKind::Error));
}

#[tokio::test]
async fn failed_start_never_becomes_a_job() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/transfer"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Source and target lists must differ."
        })))
        .mount(&server)
        .await;

    let session = session_for(&server, settings());
    session.load_collections().await.expect("load ok");
    let err = session
        .transfer(CollectionId::new("fav"), TransferSelection::All)
        .await
        .expect_err("server refused");
    assert!(matches!(err, SessionError::TransferStart(GatewayError::Status { status: 400, .. })));

    let view = session.view();
    assert!(view.jobs.is_empty());
    assert!(!view.polling);
    assert!(view.notifications[0]
        .message
        .contains("Source and target lists must differ."));
}

#[tokio::test]
async fn job_past_the_deadline_times_out_locally() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/transfer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "job-1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/transfer/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("running", 0, 0, 0)))
        .mount(&server)
        .await;

    let session = session_for(
        &server,
        SessionSettings {
            max_poll_duration: Duration::from_millis(100),
            ..settings()
        },
    );
    session.load_collections().await.expect("load ok");
    session
        .transfer(CollectionId::new("fav"), TransferSelection::Ids(vec![1]))
        .await
        .expect("transfer started");

    wait_for_jobs(&session).await;

    let view = session.view();
    assert_eq!(view.jobs[0].status, JobStatus::Failed);
    assert_eq!(view.jobs[0].error.as_deref(), Some(TIMEOUT_MESSAGE));
    assert!(view.history.is_empty());
}

#[tokio::test]
async fn duplicate_collection_name_issues_no_request() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = session_for(&server, settings());
    session.load_collections().await.expect("load ok");
    let err = session
        .create_collection("Leads")
        .await
        .expect_err("duplicate refused");
    assert!(matches!(
        err,
        SessionError::Rejected(Rejection::Collection(CollectionError::DuplicateName(_)))
    ));
}

#[tokio::test]
async fn removing_selected_companies_reloads_the_page() {
    init_logging();
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/collections/all/companies"))
        .and(body_json(json!({ "company_ids": [3] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collection_id": "all",
            "removed_count": 1,
            "message": "Removed 1 companies from 'My List'"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server, settings());
    session.load_collections().await.expect("load ok");
    session.toggle_selected(3);
    let removed = session.remove_selected().await.expect("remove ok");
    assert_eq!(removed, 1);

    let view = session.view();
    assert_eq!(view.selected_count, 0);
    assert_eq!(view.notifications[0].kind, NotificationKind::Success);
}
