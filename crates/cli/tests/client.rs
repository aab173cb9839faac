//! Client and step flow tests against an in-process mock of the Virtuoso API

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use virtuoso_cli::client::VirtuosoClient;
use virtuoso_cli::commands::exit_code_for;
use virtuoso_cli::commands::step::{self, StepTarget};
use virtuoso_common::error::exit_code;
use virtuoso_common::{
    CheckpointId, Config, Error, FileSessionStore, MemorySessionStore, SessionContext,
    SessionState, StepAction,
};

#[derive(Debug, Clone, Default)]
struct Recorded {
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Value,
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.auth_token = "test-token".to_string();
    config.http.timeout = 5;
    config.http.retry_wait = 0;
    config
}

/// Mock that records step creation requests and answers with `response`
fn recording_app(requests: Arc<Mutex<Vec<Recorded>>>, response: Value) -> Router {
    Router::new().route(
        "/teststeps",
        post(
            move |Query(query): Query<HashMap<String, String>>,
                  headers: HeaderMap,
                  Json(body): Json<Value>| {
                let requests = requests.clone();
                let response = response.clone();
                async move {
                    let headers = headers
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                        .collect();
                    requests.lock().unwrap().push(Recorded {
                        query,
                        headers,
                        body,
                    });
                    Json(response)
                }
            },
        ),
    )
}

#[tokio::test]
async fn test_create_step_request_shape() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(recording_app(
        requests.clone(),
        json!({ "success": true, "item": { "id": 19636330 } }),
    ))
    .await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let parsed = StepAction::Comment {
        text: "login flow".into(),
    }
    .parsed_step();
    let id = client
        .create_step(&CheckpointId::parse("cp_1678318").unwrap(), 3, &parsed)
        .await
        .unwrap();
    assert_eq!(id, 19636330);

    let recorded = requests.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    let request = &recorded[0];
    assert_eq!(request.query.get("envelope").map(String::as_str), Some("false"));
    assert_eq!(request.headers["authorization"], "Bearer test-token");
    assert_eq!(request.headers["x-virtuoso-client-id"], "api-cli-generator");
    assert_eq!(request.headers["x-virtuoso-client-name"], "api-cli-generator");
    assert_eq!(request.body["checkpointId"], json!(1678318));
    assert_eq!(request.body["stepIndex"], json!(3));
    assert_eq!(request.body["parsedStep"], parsed);
}

#[tokio::test]
async fn test_create_step_reads_top_level_id() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(recording_app(requests, json!({ "id": 77 }))).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let id = client
        .create_step(&CheckpointId::parse("5").unwrap(), 1, &json!({}))
        .await
        .unwrap();
    assert_eq!(id, 77);
}

#[tokio::test]
async fn test_error_envelope_maps_to_api_error() {
    let app = Router::new().route(
        "/teststeps",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": { "message": "invalid selector" } })),
            )
        }),
    );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let err = client
        .create_step(&CheckpointId::parse("5").unwrap(), 1, &json!({}))
        .await
        .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::Api { status, message }) => {
            assert_eq!(*status, 400);
            assert_eq!(message, "invalid selector");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(exit_code_for(&err), exit_code::VALIDATION);
}

#[tokio::test]
async fn test_retries_service_unavailable() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/teststeps",
        post(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "busy" })))
                } else {
                    (StatusCode::OK, Json(json!({ "item": { "id": 9 } })))
                }
            }
        }),
    );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let id = client
        .create_step(&CheckpointId::parse("5").unwrap(), 1, &json!({}))
        .await
        .unwrap();
    assert_eq!(id, 9);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/testcases/:id",
        get(move |Path(_id): Path<String>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::NOT_FOUND, "checkpoint not found")
            }
        }),
    );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let err = client
        .get_checkpoint(&CheckpointId::parse("404").unwrap())
        .await
        .unwrap_err();
    assert_eq!(exit_code_for(&err), exit_code::NOT_FOUND);
    assert!(err.to_string().contains("checkpoint not found"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_library_checkpoint_with_steps() {
    let app = Router::new().route(
        "/library/checkpoints/:id",
        get(|Path(id): Path<u64>| async move {
            Json(json!({
                "success": true,
                "item": {
                    "id": id,
                    "title": "Login",
                    "steps": [
                        { "id": 1, "action": "NAVIGATE", "value": "https://example.com" },
                        { "id": 2, "action": "CLICK", "value": "" }
                    ]
                }
            }))
        }),
    );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let library = client.get_library_checkpoint(7).await.unwrap();
    assert_eq!(library.id, 7);
    assert_eq!(library.name, "Login");
    assert_eq!(library.steps.len(), 2);
    assert_eq!(library.steps[0].action, "NAVIGATE");
}

#[tokio::test]
async fn test_step_flow_uses_session_and_advances_position() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(recording_app(
        requests.clone(),
        json!({ "item": { "id": 100 } }),
    ))
    .await;
    let config = config_for(&base);

    let store = MemorySessionStore::with_state(SessionState {
        current_checkpoint_id: Some(CheckpointId::parse("42").unwrap()),
        next_position: 3,
        ..SessionState::default()
    });
    let mut session = SessionContext::load(store.clone()).unwrap();

    let action = StepAction::AssertExists {
        element: "Welcome".into(),
    };
    let output = step::create(&config, &mut session, &action, &StepTarget::default())
        .await
        .unwrap();

    assert_eq!(output.step_id, 100);
    assert_eq!(output.position, 3);
    assert_eq!(output.checkpoint_id.as_str(), "42");
    assert!(output.using_context);
    assert!(output.auto_position);
    assert_eq!(store.snapshot().unwrap().next_position, 4);

    // explicit placement leaves the session alone
    let target = StepTarget {
        position: Some("9".into()),
        checkpoint: Some("77".into()),
    };
    let output = step::create(&config, &mut session, &action, &target)
        .await
        .unwrap();
    assert_eq!(output.position, 9);
    assert!(!output.using_context);
    assert!(!output.auto_position);
    assert_eq!(store.snapshot().unwrap().next_position, 4);

    let recorded = requests.lock().unwrap();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].body["checkpointId"], json!(77));
    assert_eq!(recorded[1].body["stepIndex"], json!(9));
}

#[tokio::test]
async fn test_local_failures_send_nothing() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(recording_app(requests.clone(), json!({ "item": { "id": 1 } }))).await;
    let config = config_for(&base);
    let mut session = SessionContext::load(MemorySessionStore::new()).unwrap();

    let action = StepAction::Hover {
        selector: "Menu".into(),
    };
    let err = step::create(&config, &mut session, &action, &StepTarget::default())
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoCheckpoint)));

    let target = StepTarget {
        position: Some("first".into()),
        checkpoint: Some("5".into()),
    };
    let err = step::create(&config, &mut session, &action, &target)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidPosition(_))
    ));

    let blank = StepAction::Hover {
        selector: " ".into(),
    };
    let err = step::create(&config, &mut session, &blank, &target)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidArgument(_))
    ));

    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_step_created_even_when_session_cannot_be_saved() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let base = spawn(recording_app(requests.clone(), json!({ "item": { "id": 55 } }))).await;
    let config = config_for(&base);

    // a directory in place of the session file makes every save fail
    let tmp = tempfile::TempDir::new().unwrap();
    let state = SessionState {
        current_checkpoint_id: Some(CheckpointId::parse("42").unwrap()),
        next_position: 6,
        ..SessionState::default()
    };
    let mut session = SessionContext::new(FileSessionStore::new(tmp.path()), state);

    let action = StepAction::Comment {
        text: "after login".into(),
    };
    let output = step::create(&config, &mut session, &action, &StepTarget::default())
        .await
        .unwrap();

    assert_eq!(output.step_id, 55);
    assert_eq!(output.position, 6);
    assert!(output.auto_position);
    assert_eq!(session.state().next_position, 6);
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_checkpoint_and_attach() {
    let bodies = Arc::new(Mutex::new(Vec::<(String, Value)>::new()));
    let created = bodies.clone();
    let attached = bodies.clone();
    let app = Router::new()
        .route(
            "/testcases",
            post(move |Json(body): Json<Value>| {
                let created = created.clone();
                async move {
                    created.lock().unwrap().push(("create".into(), body));
                    Json(json!({ "success": true, "item": { "id": 1680001, "title": "Checkout Test" } }))
                }
            }),
        )
        .route(
            "/testsuites/:id/checkpoints/attach",
            post(move |Path(id): Path<u64>, Json(body): Json<Value>| {
                let attached = attached.clone();
                async move {
                    attached.lock().unwrap().push((format!("attach {}", id), body));
                    Json(json!({ "success": true }))
                }
            }),
        );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let checkpoint = client
        .create_checkpoint(13776, 43802, "Checkout Test")
        .await
        .unwrap();
    assert_eq!(checkpoint.id, 1680001);
    client
        .attach_checkpoint(608038, checkpoint.id, 3)
        .await
        .unwrap();

    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies[0].0, "create");
    assert_eq!(
        bodies[0].1,
        json!({ "goalId": 13776, "snapshotId": 43802, "title": "Checkout Test" })
    );
    assert_eq!(bodies[1].0, "attach 608038");
    assert_eq!(bodies[1].1, json!({ "checkpointId": 1680001, "position": 3 }));
}

#[tokio::test]
async fn test_create_checkpoint_without_id_fails() {
    let app = Router::new().route(
        "/testcases",
        post(|| async { Json(json!({ "success": true, "item": {} })) }),
    );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    assert!(client.create_checkpoint(1, 2, "Empty").await.is_err());
}

#[tokio::test]
async fn test_list_checkpoints_numbers_journey_order() {
    let app = Router::new().route(
        "/testsuites/:id",
        get(|Path(id): Path<u64>| async move {
            Json(json!({
                "success": true,
                "item": {
                    "id": id,
                    "name": "Checkout journey",
                    "cases": [
                        { "id": 11, "title": "Navigate", "steps": [{ "id": 1 }] },
                        { "id": 12, "title": "Pay", "steps": [] }
                    ]
                }
            }))
        }),
    );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let journey = client.list_checkpoints(608048).await.unwrap();
    assert_eq!(journey.id, 608048);
    assert_eq!(journey.display_name(), "Checkout journey");
    let positions: Vec<(u64, u32)> = journey.cases.iter().map(|c| (c.id, c.position)).collect();
    assert_eq!(positions, vec![(11, 1), (12, 2)]);
    assert_eq!(journey.cases[0].steps.len(), 1);
}

#[tokio::test]
async fn test_get_step() {
    let app = Router::new().route(
        "/teststeps/:id",
        get(|Path(id): Path<u64>| async move {
            if id != 19636330 {
                return (StatusCode::NOT_FOUND, Json(json!({ "error": "step not found" })));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "item": {
                        "id": id,
                        "checkpointId": 1678318,
                        "stepIndex": 2,
                        "action": "CLICK",
                        "value": "",
                        "optional": true,
                        "meta": { "kind": "CLICK" }
                    }
                })),
            )
        }),
    );
    let base = spawn(app).await;

    let client = VirtuosoClient::new(&config_for(&base)).unwrap();
    let step = client.get_step(19636330).await.unwrap();
    assert_eq!(step.checkpoint_id, 1678318);
    assert_eq!(step.step_index, 2);
    assert_eq!(step.action, "CLICK");
    assert!(step.optional);
    assert_eq!(step.meta["kind"], "CLICK");

    let err = client.get_step(1).await.unwrap_err();
    assert_eq!(exit_code_for(&err), exit_code::NOT_FOUND);
    assert!(err.to_string().contains("step not found"));
}
