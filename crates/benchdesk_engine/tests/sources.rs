use std::sync::{Arc, Mutex};
use std::time::Duration;

use benchdesk_core::{EventKind, TaskEvent, TaskId};
use benchdesk_engine::{
    ClientSettings, EngineEvent, EventSink, EventSource, FailureKind, PollSource, ReqwestBackend,
    SourceExit, StreamSource,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        poll_backoff_initial: Duration::from_millis(5),
        poll_backoff_max: Duration::from_millis(20),
        poll_max_retries: 2,
        ..ClientSettings::default()
    }
}

fn poll_source(settings: ClientSettings) -> PollSource {
    let backend = ReqwestBackend::new(settings.clone()).expect("client builds");
    PollSource::new(Arc::new(backend), settings)
}

fn task() -> TaskId {
    TaskId::new("t1")
}

async fn respond_once(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

fn forwarded(events: Vec<EngineEvent>) -> Vec<TaskEvent> {
    events
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::SourceEvent(event) => Some(event),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn poll_forwards_until_end_marker() {
    let server = MockServer::start().await;
    respond_once(
        &server,
        json!({"task_id": "older", "type": "text", "interactive": true, "message": "stale"}),
    )
    .await;
    respond_once(
        &server,
        json!({"task_id": "t1", "type": "text", "interactive": true, "message": "Pulling"}),
    )
    .await;
    respond_once(
        &server,
        json!({"task_id": "t1", "end": true, "response": {"status": "success"}}),
    )
    .await;

    let source = poll_source(settings(&server));
    let sink = TestSink::default();
    let exit = source.run(&task(), &sink, &CancellationToken::new()).await;

    assert_eq!(exit, SourceExit::Completed);
    assert_eq!(
        forwarded(sink.take()),
        vec![
            TaskEvent::Message {
                task_id: Some(task()),
                kind: EventKind::Text,
                interactive: true,
                message: "Pulling".into(),
            },
            TaskEvent::End {
                task_id: Some(task()),
                response: Some(json!({"status": "success"})),
            },
        ]
    );
}

#[tokio::test]
async fn poll_stops_after_blocking_prompt() {
    let server = MockServer::start().await;
    respond_once(
        &server,
        json!({"task_id": "t1", "type": "prompt", "interactive": false, "message": "Send report?"}),
    )
    .await;

    let source = poll_source(settings(&server));
    let sink = TestSink::default();
    let exit = source.run(&task(), &sink, &CancellationToken::new()).await;

    assert_eq!(exit, SourceExit::PromptOutstanding);
    assert_eq!(forwarded(sink.take()).len(), 1);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn poll_skips_malformed_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    respond_once(
        &server,
        json!({"task_id": "t1", "type": "sparkle", "message": "unknown type"}),
    )
    .await;
    respond_once(&server, json!({"task_id": "t1", "end": true})).await;

    let source = poll_source(settings(&server));
    let sink = TestSink::default();
    let exit = source.run(&task(), &sink, &CancellationToken::new()).await;

    assert_eq!(exit, SourceExit::Completed);
    assert_eq!(
        forwarded(sink.take()),
        vec![TaskEvent::End {
            task_id: Some(task()),
            response: None,
        }]
    );
}

#[tokio::test]
async fn poll_gives_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = poll_source(settings(&server));
    let sink = TestSink::default();
    let exit = source.run(&task(), &sink, &CancellationToken::new()).await;

    match exit {
        SourceExit::Failed(err) => assert_eq!(err.kind, FailureKind::HttpStatus(500)),
        other => panic!("expected failure, got {other:?}"),
    }
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn poll_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    respond_once(&server, json!({"task_id": "t1", "end": true})).await;

    let source = poll_source(settings(&server));
    let sink = TestSink::default();
    let exit = source.run(&task(), &sink, &CancellationToken::new()).await;
    assert_eq!(exit, SourceExit::Completed);
}

#[tokio::test]
async fn poll_honours_cancellation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let source = poll_source(settings(&server));
    let sink = TestSink::default();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let exit = source.run(&task(), &sink, &cancel).await;
    assert_eq!(exit, SourceExit::Cancelled);
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn poll_expires_after_lifetime() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let settings = ClientSettings {
        poll_max_lifetime: Duration::from_millis(50),
        ..settings(&server)
    };
    let source = poll_source(settings);
    let exit = source
        .run(&task(), &TestSink::default(), &CancellationToken::new())
        .await;
    assert_eq!(exit, SourceExit::Expired);
}

fn sse(records: &[Value]) -> String {
    records
        .iter()
        .map(|record| format!("data: {record}\n\n"))
        .collect()
}

#[tokio::test]
async fn stream_filters_and_stops_at_end() {
    let server = MockServer::start().await;
    let body = sse(&[
        json!({"task_id": "t1", "type": "print", "interactive": true, "message": "old line"}),
        json!({"task_id": "other", "type": "print", "interactive": true, "message": "foreign"}),
        json!({"kind": "chunk", "task_id": "t1", "events": [{"message": "a"}, {"message": "b"}], "length": 2, "size_bytes": 2}),
        json!({"task_id": "t1", "end": true, "response": {"status": "success", "dataset_id": 3}}),
        json!({"task_id": "t1", "type": "print", "interactive": true, "message": "after end"}),
    ]);
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(query_param("stream_old", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(settings(&server)).expect("client builds");
    let source = StreamSource::new(backend);
    let sink = TestSink::default();
    let exit = source.run(&task(), &sink, &CancellationToken::new()).await;

    assert_eq!(exit, SourceExit::Completed);
    assert_eq!(
        forwarded(sink.take()),
        vec![
            TaskEvent::Message {
                task_id: Some(task()),
                kind: EventKind::Print,
                interactive: true,
                message: "old line".into(),
            },
            TaskEvent::Chunk {
                task_id: Some(task()),
                lines: vec!["a".into(), "b".into()],
            },
            TaskEvent::End {
                task_id: Some(task()),
                response: Some(json!({"status": "success", "dataset_id": 3})),
            },
        ]
    );
}

#[tokio::test]
async fn stream_stops_after_prompt() {
    let server = MockServer::start().await;
    let body = sse(&[
        json!({"task_id": "t1", "type": "prompt", "interactive": false, "message": "Proceed?"}),
        json!({"task_id": "t1", "type": "print", "interactive": true, "message": "later"}),
    ]);
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(settings(&server)).expect("client builds");
    let sink = TestSink::default();
    let exit = StreamSource::new(backend)
        .run(&task(), &sink, &CancellationToken::new())
        .await;

    assert_eq!(exit, SourceExit::PromptOutstanding);
    assert_eq!(forwarded(sink.take()).len(), 1);
}

#[tokio::test]
async fn stream_closed_early_is_a_failure() {
    let server = MockServer::start().await;
    let body = sse(&[json!({"task_id": "t1", "type": "text", "interactive": true, "message": "only"})]);
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(settings(&server)).expect("client builds");
    let exit = StreamSource::new(backend)
        .run(&task(), &TestSink::default(), &CancellationToken::new())
        .await;
    assert!(matches!(exit, SourceExit::Failed(err) if err.kind == FailureKind::Network));
}

#[tokio::test]
async fn stream_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(settings(&server)).expect("client builds");
    let exit = StreamSource::new(backend)
        .run(&task(), &TestSink::default(), &CancellationToken::new())
        .await;
    assert!(matches!(exit, SourceExit::Failed(err) if err.kind == FailureKind::HttpStatus(401)));
}
