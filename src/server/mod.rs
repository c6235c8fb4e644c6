//! HTTP trigger surface.
//!
//! JSON API under `/api`: trigger runs, preview and generate content,
//! publish single items, and inspect status and logs. Run triggering is
//! two-phase: the handler reserves the single-flight slot, then hands the
//! run to the background worker and returns immediately; callers watch
//! progress via `GET /api/status`.

pub mod error;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::{Config, Integration};
use crate::core::orchestrator::DEFAULT_DESTINATIONS;
use crate::core::{RunRequest, Station, WorkerHandle};
use crate::domain::{
    ContentItem, ContentKind, ContentPackage, LogEntry, LogLevel, Platform, PublishResult,
    RunMode, Task, TaskPayload, TaskResult,
};
use crate::generator::ContentGenerator;
use crate::mailbox::Mailbox;
use crate::publishers::{PublishError, PublisherRegistry};

pub use error::ApiError;

/// Uniform JSON envelope for every response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Everything the handlers need, shared by reference.
pub struct AppContext {
    pub config: Config,
    pub station: Arc<Station>,
    pub generator: Arc<ContentGenerator>,
    pub registry: Arc<PublisherRegistry>,
    pub mailbox: Arc<Mailbox>,
    pub worker: WorkerHandle,
}

/// Build the API router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/run", post(run))
        .route("/api/preview", post(preview))
        .route("/api/generate", post(generate))
        .route("/api/publish", post(publish))
        .route("/api/logs", get(logs))
        .route("/api/clear-logs", post(clear_logs))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Bind and serve until shutdown.
pub async fn serve(ctx: Arc<AppContext>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Dashboard API listening");
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

#[derive(Debug, Serialize)]
struct IntegrationStatus {
    connected: bool,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
    demo_mode: bool,
    integrations: BTreeMap<&'static str, IntegrationStatus>,
    current_task: Option<TaskResult>,
    logs: Vec<LogEntry>,
}

async fn status(State(ctx): State<Arc<AppContext>>) -> Json<ApiResponse<StatusBody>> {
    let snapshot = ctx.config.snapshot();
    let integrations = Integration::ALL
        .iter()
        .map(|i| {
            (
                i.key(),
                IntegrationStatus {
                    connected: snapshot.integrations.get(i.key()).copied().unwrap_or(false),
                    name: i.display_name(),
                },
            )
        })
        .collect();

    Json(ApiResponse::success(StatusBody {
        status: "online",
        demo_mode: snapshot.demo_mode,
        integrations,
        current_task: ctx.station.current(),
        logs: ctx.station.tail(20),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct RunBody {
    demo: Option<bool>,
    email: Option<TaskPayload>,
}

#[derive(Debug, Serialize)]
struct RunStarted {
    task_id: String,
}

async fn run(
    State(ctx): State<Arc<AppContext>>,
    body: Option<Json<RunBody>>,
) -> Result<Json<ApiResponse<RunStarted>>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let use_demo = body.demo.unwrap_or(true);
    // The demo flag decides the mode even for a custom email: the adapters
    // are already frozen per Config, so the mode tag must reflect the flag
    // the caller sent, not the input source.
    let mode = if use_demo {
        RunMode::Demo
    } else {
        RunMode::Production
    };

    let task = if let Some(payload) = body.email {
        ctx.station.log(
            LogLevel::Info,
            format!("Processing custom email: {}", payload.subject),
        );
        Task::from_payload(payload)
    } else if use_demo {
        ctx.station
            .log(LogLevel::Info, "Running in demo mode with sample data");
        Task::sample()
    } else {
        ctx.station.log(LogLevel::Info, "Checking for new emails...");
        ctx.mailbox.fetch_task().await
    };

    let slot = ctx.station.begin(&task, mode)?;
    let task_id = task.id.clone();

    if let Err(e) = ctx.worker.enqueue(RunRequest {
        task,
        slot,
        destinations: DEFAULT_DESTINATIONS.to_vec(),
    }) {
        // Release the reserved slot so the next attempt is not stuck busy
        ctx.station.update(|r| r.fail("run worker unavailable"));
        return Err(e.into());
    }

    Ok(Json(ApiResponse::success(RunStarted { task_id })))
}

#[derive(Debug, Default, Deserialize)]
struct PreviewBody {
    subject: Option<String>,
    body: Option<String>,
}

#[derive(Debug, Serialize)]
struct PreviewResponse {
    content: ContentPackage,
}

async fn preview(
    State(ctx): State<Arc<AppContext>>,
    body: Option<Json<PreviewBody>>,
) -> Result<Json<ApiResponse<PreviewResponse>>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let subject = body.subject.unwrap_or_else(|| "Preview Request".to_string());
    let text = body
        .body
        .unwrap_or_else(|| "Generate sample content".to_string());

    ctx.station
        .log(LogLevel::Info, format!("Generating preview for: {subject}"));

    let content = ctx.generator.preview(&subject, &text).await?;
    ctx.station
        .log(LogLevel::Success, "Preview generated successfully");

    Ok(Json(ApiResponse::success(PreviewResponse { content })))
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    request: String,
    platform: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    content: ContentItem,
}

async fn generate(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<ApiResponse<GenerateResponse>>, ApiError> {
    if body.request.trim().is_empty() {
        return Err(ApiError::BadRequest("Request text is required".to_string()));
    }

    let kind: ContentKind = body
        .kind
        .parse()
        .map_err(|e: crate::domain::UnknownContentKind| ApiError::BadRequest(e.to_string()))?;

    let platform = body
        .platform
        .as_deref()
        .map(str::parse::<Platform>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ctx.station
        .log(LogLevel::Info, format!("Generating {kind}..."));

    let content = ctx.generator.generate_one(kind, &body.request, platform).await?;
    ctx.station.log(LogLevel::Success, format!("{kind} generated"));

    Ok(Json(ApiResponse::success(GenerateResponse { content })))
}

#[derive(Debug, Default, Deserialize)]
struct PublishContent {
    title: Option<String>,
    content: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublishBody {
    platform: String,
    #[serde(default)]
    content: PublishContent,
}

#[derive(Debug, Serialize)]
struct PublishResponse {
    result: PublishResult,
}

async fn publish(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<PublishBody>,
) -> Result<Json<ApiResponse<PublishResponse>>, ApiError> {
    let platform: Platform = body
        .platform
        .parse()
        .map_err(|e: crate::domain::UnknownPlatform| ApiError::BadRequest(e.to_string()))?;

    let publisher = ctx
        .registry
        .get(platform)
        .ok_or_else(|| ApiError::Internal(format!("no adapter registered for {platform}")))?;

    ctx.station
        .log(LogLevel::Info, format!("Publishing to {platform}..."));

    let outcome = match platform {
        Platform::WordPress => {
            let title = body.content.title.unwrap_or_else(|| "Untitled".to_string());
            let content = body.content.content.unwrap_or_default();
            publisher.create_draft(&title, &content, None).await
        }
        Platform::LinkedIn | Platform::Twitter => {
            let text = body.content.text.unwrap_or_default();
            publisher.publish("", &text, None).await
        }
    };

    let result = outcome.map_err(|e| match e {
        PublishError::Unsupported { .. } => ApiError::BadRequest(e.to_string()),
        other => ApiError::Internal(other.to_string()),
    })?;

    ctx.station
        .log(LogLevel::Success, format!("Published to {platform}"));

    Ok(Json(ApiResponse::success(PublishResponse { result })))
}

#[derive(Debug, Serialize)]
struct LogsBody {
    logs: Vec<LogEntry>,
}

async fn logs(State(ctx): State<Arc<AppContext>>) -> Json<ApiResponse<LogsBody>> {
    Json(ApiResponse::success(LogsBody {
        logs: ctx.station.all_logs(),
    }))
}

#[derive(Debug, Serialize)]
struct ClearedBody {
    status: &'static str,
}

async fn clear_logs(State(ctx): State<Arc<AppContext>>) -> Json<ApiResponse<ClearedBody>> {
    ctx.station.clear_logs();
    Json(ApiResponse::success(ClearedBody { status: "cleared" }))
}
