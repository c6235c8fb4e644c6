//! HTTP surface tests, driven through `Router::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use postpilot::config::Config;
use postpilot::core::{worker, Orchestrator, Station};
use postpilot::domain::{RunMode, Task};
use postpilot::generator::ContentGenerator;
use postpilot::mailbox::Mailbox;
use postpilot::publishers::{
    LinkedInPublisher, PublisherRegistry, TwitterPublisher, WordPressPublisher,
};
use postpilot::server::{self, AppContext};

async fn test_app() -> (Router, Arc<AppContext>) {
    let config = Config::default();
    let station = Arc::new(Station::new());
    let generator =
        Arc::new(ContentGenerator::new(&config).with_think_delay(Duration::ZERO));

    let mut registry = PublisherRegistry::empty();
    registry.insert(Arc::new(
        WordPressPublisher::connect(&config)
            .await
            .with_mock_latency(Duration::ZERO),
    ));
    registry.insert(Arc::new(
        LinkedInPublisher::connect(&config)
            .await
            .with_mock_latency(Duration::ZERO),
    ));
    registry.insert(Arc::new(
        TwitterPublisher::connect(&config)
            .await
            .with_mock_latency(Duration::ZERO),
    ));
    let registry = Arc::new(registry);

    let mailbox = Arc::new(Mailbox::new(&config).with_poll_delay(Duration::ZERO));
    let orchestrator = Arc::new(Orchestrator::new(
        station.clone(),
        generator.clone(),
        registry.clone(),
        mailbox.clone(),
    ));
    let worker = worker::spawn(orchestrator);

    let ctx = Arc::new(AppContext {
        config,
        station,
        generator,
        registry,
        mailbox,
        worker,
    });
    (server::router(ctx.clone()), ctx)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn status_reports_online_with_all_integrations() {
    let (app, _ctx) = test_app().await;

    let response = app.oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["status"], "online");
    assert_eq!(data["demo_mode"], true);
    let integrations = data["integrations"].as_object().unwrap();
    assert_eq!(integrations.len(), 5);
    assert_eq!(integrations["wordpress"]["connected"], false);
    assert_eq!(integrations["openai"]["name"], "OpenAI GPT-4");
}

#[tokio::test]
async fn run_returns_the_sample_task_id() {
    let (app, _ctx) = test_app().await;

    let response = app
        .oneshot(post_json("/api/run", json!({ "demo": true })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["task_id"], "msg_98765");
}

#[tokio::test]
async fn run_is_rejected_while_another_is_in_flight() {
    let (app, ctx) = test_app().await;

    // Occupy the single-flight slot directly
    let _slot = ctx.station.begin(&Task::sample(), RunMode::Demo).unwrap();

    let response = app
        .oneshot(post_json("/api/run", json!({ "demo": true })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn custom_email_run_keeps_the_demo_tag() {
    let (app, ctx) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/run",
            json!({
                "demo": true,
                "email": {
                    "subject": "Launch brief: 'Bamboo Desk Organizer'",
                    "body": "Write up the new product: 'Bamboo Desk Organizer'."
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The demo flag, not the input source, decides the mode tag
    let result = ctx.station.current().unwrap();
    assert_eq!(result.mode, RunMode::Demo);
    assert_eq!(result.task_subject, "Launch brief: 'Bamboo Desk Organizer'");
}

#[tokio::test]
async fn preview_generates_without_publishing() {
    let (app, ctx) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/preview",
            json!({ "subject": "Preview", "body": "Content for 'Desk Mat'" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let content = &body["data"]["content"];
    assert!(content["blog_post"]["title"]
        .as_str()
        .unwrap()
        .contains("Desk Mat"));
    assert!(!content["social_post"].as_str().unwrap().is_empty());

    // Preview never touches the run slot
    assert!(ctx.station.current().is_none());
}

#[tokio::test]
async fn generate_validates_type_and_request_text() {
    let (app, _ctx) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({ "type": "blog_post", "request": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate",
            json!({ "type": "press_release", "request": "launch week" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/api/generate",
            json!({ "type": "social_post", "request": "launch week", "platform": "twitter" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["content"]["kind"], "social_post");
    assert_eq!(body["data"]["content"]["platform"], "twitter");
}

#[tokio::test]
async fn publish_rejects_unknown_platforms() {
    let (app, _ctx) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/publish",
            json!({ "platform": "myspace", "content": { "text": "hi" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("myspace"));
}

#[tokio::test]
async fn publish_wordpress_returns_a_draft_link() {
    let (app, _ctx) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/publish",
            json!({
                "platform": "wordpress",
                "content": { "title": "T", "content": "B" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let result = &body["data"]["result"];
    assert_eq!(result["success"], true);
    assert!(result["link"]
        .as_str()
        .unwrap()
        .contains("&preview=true"));
}

#[tokio::test]
async fn logs_can_be_read_and_cleared() {
    let (app, ctx) = test_app().await;

    ctx.station
        .log(postpilot::domain::LogLevel::Info, "first entry");

    let response = app.clone().oneshot(get("/api/logs")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["logs"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(post_json("/api/clear-logs", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Clearing leaves only the "Logs cleared" marker
    let response = app.oneshot(get("/api/logs")).await.unwrap();
    let body = body_json(response).await;
    let logs = body["data"]["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["message"], "Logs cleared");
}
