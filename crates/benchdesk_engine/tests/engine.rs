use std::time::{Duration, Instant};

use benchdesk_core::{ActionRequest, TaskEvent, TaskId};
use benchdesk_engine::{ClientSettings, EngineEvent, EngineHandle, FailureKind, SourceExit};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        poll_backoff_initial: Duration::from_millis(5),
        poll_backoff_max: Duration::from_millis(20),
        task_id_attempts: 3,
        ..ClientSettings::default()
    }
}

async fn recv(handle: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(event) = handle.try_recv() {
            return event;
        }
        assert!(Instant::now() < deadline, "no engine event within 5s");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn resolves_task_after_null_answers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current_task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": null})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/current_task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t9"})))
        .mount(&server)
        .await;

    let handle = EngineHandle::new(settings(&server)).expect("engine starts");
    handle.resolve_task();

    assert_eq!(
        recv(&handle).await,
        EngineEvent::TaskIdResolved(Ok(TaskId::new("t9")))
    );
}

#[tokio::test]
async fn task_resolution_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current_task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let handle = EngineHandle::new(settings(&server)).expect("engine starts");
    handle.resolve_task();

    match recv(&handle).await {
        EngineEvent::TaskIdResolved(Err(err)) => assert_eq!(err.kind, FailureKind::Unavailable),
        other => panic!("unexpected {other:?}"),
    }
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn open_source_forwards_events_then_closes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"task_id": "t1", "type": "print", "interactive": true, "message": "hello"}),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1", "end": true})))
        .mount(&server)
        .await;

    let handle = EngineHandle::new(settings(&server)).expect("engine starts");
    handle.open_source(TaskId::new("t1"));

    assert!(matches!(
        recv(&handle).await,
        EngineEvent::SourceEvent(TaskEvent::Message { .. })
    ));
    assert!(matches!(
        recv(&handle).await,
        EngineEvent::SourceEvent(TaskEvent::End { .. })
    ));
    assert_eq!(
        recv(&handle).await,
        EngineEvent::SourceClosed(SourceExit::Completed)
    );
}

#[tokio::test]
async fn closed_source_reports_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({"task_id": "t1", "end": true})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let handle = EngineHandle::new(settings(&server)).expect("engine starts");
    handle.open_source(TaskId::new("t1"));
    handle.close_source();
    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.fetch_notifications();

    // The cancelled source is silent; the first event is the notification list.
    assert_eq!(recv(&handle).await, EngineEvent::NotificationsFetched(Ok(Vec::new())));
}

#[tokio::test]
async fn action_result_carries_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets/prepare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(&server)
        .await;

    let handle = EngineHandle::new(settings(&server)).expect("engine starts");
    handle.submit_action(ActionRequest::new("/datasets/prepare").field("dataset_id", "3"));

    match recv(&handle).await {
        EngineEvent::ActionCompleted { endpoint, result } => {
            assert_eq!(endpoint, "/datasets/prepare");
            assert!(result.expect("response").is_success());
        }
        other => panic!("unexpected {other:?}"),
    }
}
