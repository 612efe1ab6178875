//! HTTP surface. Handlers convert service failures into `{"error": ...}`
//! payloads; a collaborator failure never crashes a request.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::assessment::AssessmentService;
use crate::config::Config;
use crate::errors::ServiceError;
use crate::extract;
use crate::ingest::IngestTracker;
use crate::llm::TextGenerator;
use crate::models::ReportedMistake;
use crate::progress::ProgressService;
use crate::prompts;
use crate::roadmap::RoadmapService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn TextGenerator>,
    pub assessments: Arc<AssessmentService>,
    pub progress: Arc<ProgressService>,
    pub roadmaps: Arc<RoadmapService>,
    pub ingest: IngestTracker,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/upload", post(upload_files))
        .route("/ask", post(ask_question))
        .route("/ingest/status", get(ingest_status))
        .route("/assessment/:session_id/:level", get(get_assessment))
        .route("/assessment/submit", post(submit_assessment))
        .route("/progress/:session_id", get(get_progress))
        .route("/mistakes/:session_id", get(get_mistakes))
        .route("/mistakes/comment", post(update_mistake_comment))
        .route("/roadmap/generate", post(generate_roadmap))
        .route("/roadmap/list/:session_id", get(list_roadmaps))
        .route("/roadmap/:roadmap_id", get(get_roadmap))
        .route(
            "/roadmap/:roadmap_id/week/:week_number",
            post(generate_week_content),
        )
        .route(
            "/roadmap/:roadmap_id/complete/:day_number",
            post(complete_day),
        )
        .with_state(state)
}

// ---- Status Endpoints ----

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Study Assistant Bot API is running!",
        "endpoints": {
            "upload": "/upload (POST)",
            "status": "/health (GET)"
        }
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy", "service": "study-assistant"}))
}

// ---- Upload & Ingestion ----

#[derive(Deserialize)]
struct SessionParams {
    #[serde(default = "default_session")]
    session_id: String,
}

fn default_session() -> String {
    "default".to_string()
}

async fn upload_files(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
    mut multipart: Multipart,
) -> Response {
    let session_dir = state.config.upload_root.join(&params.session_id);
    if let Err(err) = tokio::fs::create_dir_all(&session_dir).await {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string());
    }

    let mut uploaded_files: Vec<String> = Vec::new();
    let mut rejected_files: Vec<String> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        };

        let Some(raw_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        // keep only the terminal path component; uploads must land inside
        // the session folder
        let file_name = std::path::Path::new(&raw_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if file_name.is_empty() {
            continue;
        }

        if !file_name.to_ascii_lowercase().ends_with(".pdf") {
            rejected_files.push(file_name);
            continue;
        }

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => {
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Failed to save file {file_name}: {err}"),
                );
            }
        };
        if let Err(err) = tokio::fs::write(session_dir.join(&file_name), &data).await {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to save file {file_name}: {err}"),
            );
        }
        uploaded_files.push(file_name);
    }

    if uploaded_files.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No valid PDF files were uploaded");
    }

    info!(
        session = %params.session_id,
        accepted = uploaded_files.len(),
        rejected = rejected_files.len(),
        "upload accepted"
    );
    state
        .ingest
        .schedule(state.config.upload_root.clone(), params.session_id.clone());

    Json(json!({
        "session_id": params.session_id,
        "status": "processing",
        "uploaded_files": uploaded_files,
        "rejected_files": rejected_files,
    }))
    .into_response()
}

async fn ingest_status(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Response {
    match state.ingest.status(&params.session_id) {
        Some(status) => Json(status).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "No ingestion job for this session",
        ),
    }
}

// ---- Doubt Assistant ----

#[derive(Deserialize)]
struct AskParams {
    session_id: String,
    query: String,
}

async fn ask_question(State(state): State<AppState>, Query(params): Query<AskParams>) -> Response {
    let context = extract::session_text(&state.config.upload_root, &params.session_id);
    let prompt = prompts::doubt_prompt(&context, &params.query);
    match state.generator.generate(&prompt, false).await {
        Ok(answer) => Json(json!({"response": answer})).into_response(),
        Err(err) => {
            error!(session = %params.session_id, error = %err, "doubt assistant request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

// ---- Assessments & Progress ----

async fn get_assessment(
    State(state): State<AppState>,
    Path((session_id, level)): Path<(String, u8)>,
) -> Response {
    if !(1..=3).contains(&level) {
        return error_response(StatusCode::BAD_REQUEST, "level must be 1, 2, or 3");
    }
    match state.assessments.generate(&session_id, level).await {
        Ok(assessment) => Json(assessment).into_response(),
        Err(err @ ServiceError::NoDocuments) => {
            Json(json!({"error": err.to_string()})).into_response()
        }
        Err(err) => {
            error!(session = %session_id, level, error = %err, "assessment generation failed");
            Json(json!({"error": "Failed to generate assessment."})).into_response()
        }
    }
}

#[derive(Deserialize)]
struct SubmitRequest {
    session_id: String,
    level: u8,
    score: u32,
    max_score: u32,
    #[serde(default)]
    mistakes: Vec<ReportedMistake>,
}

async fn submit_assessment(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Response {
    match state.progress.submit_result(
        &body.session_id,
        body.level,
        body.score,
        body.max_score,
        &body.mistakes,
    ) {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn get_progress(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    match state.progress.get_progress(&session_id) {
        Ok(record) => Json(record).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn get_mistakes(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    // "all" aggregates across every session
    if session_id == "all" {
        match state.progress.all_mistakes() {
            Ok(mistakes) => Json(mistakes).into_response(),
            Err(err) => internal_error(err),
        }
    } else {
        match state.progress.mistakes_for(&session_id) {
            Ok(mistakes) => Json(mistakes).into_response(),
            Err(err) => internal_error(err),
        }
    }
}

#[derive(Deserialize)]
struct CommentRequest {
    session_id: String,
    question: String,
    comment: String,
}

async fn update_mistake_comment(
    State(state): State<AppState>,
    Json(body): Json<CommentRequest>,
) -> Response {
    match state
        .progress
        .update_mistake_comment(&body.session_id, &body.question, &body.comment)
    {
        Ok(updated) => Json(json!({"updated": updated})).into_response(),
        Err(err) => internal_error(err),
    }
}

// ---- Roadmaps ----

#[derive(Deserialize)]
struct RoadmapRequest {
    prompt: String,
    session_id: String,
}

async fn generate_roadmap(
    State(state): State<AppState>,
    Json(body): Json<RoadmapRequest>,
) -> Response {
    match state.roadmaps.generate(&body.prompt, &body.session_id).await {
        Ok(roadmap) => Json(roadmap).into_response(),
        Err(err) => {
            error!(session = %body.session_id, error = %err, "roadmap generation failed");
            Json(json!({"error": err.to_string()})).into_response()
        }
    }
}

async fn list_roadmaps(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    match state.roadmaps.list(&session_id) {
        Ok(summaries) => Json(summaries).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn get_roadmap(State(state): State<AppState>, Path(roadmap_id): Path<String>) -> Response {
    match state.roadmaps.get(&roadmap_id) {
        Ok(Some(roadmap)) => Json(roadmap).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Roadmap not found"),
        Err(err) => internal_error(err),
    }
}

async fn generate_week_content(
    State(state): State<AppState>,
    Path((roadmap_id, week_number)): Path<(String, u32)>,
) -> Response {
    match state
        .roadmaps
        .generate_week_content(&roadmap_id, week_number)
        .await
    {
        Ok(_) => Json(json!({"status": "success", "week_number": week_number})).into_response(),
        Err(ServiceError::NotFound(message)) => {
            Json(json!({"error": message})).into_response()
        }
        Err(err @ (ServiceError::MalformedOutput(_) | ServiceError::Serialization(_))) => {
            error!(roadmap = %roadmap_id, week = week_number, error = %err, "week content failed");
            Json(json!({"error": "Failed to parse AI response for week content"})).into_response()
        }
        Err(err) => {
            error!(roadmap = %roadmap_id, week = week_number, error = %err, "week content failed");
            Json(json!({"error": err.to_string()})).into_response()
        }
    }
}

async fn complete_day(
    State(state): State<AppState>,
    Path((roadmap_id, day_number)): Path<(String, u32)>,
) -> Response {
    match state.roadmaps.update_progress(&roadmap_id, day_number) {
        Ok(Some(roadmap)) => Json(roadmap).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Roadmap not found"),
        Err(err) => internal_error(err),
    }
}

// ---- Helpers ----

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

fn internal_error(err: ServiceError) -> Response {
    error!(error = %err, "request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}
