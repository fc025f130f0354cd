pub mod config;
pub mod pages;
pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Json, Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use deskmate_adapters::Adapters;
use deskmate_agents::{Assistant, DocumentAnswer};
use deskmate_core::FaqTable;
use deskmate_ml::LazyModel;
use deskmate_observability::{AppMetrics, MetricsSnapshot};
use deskmate_storage::{UploadError, UploadStore};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use config::Settings;
pub use session::SessionStore;

pub const NO_FILE_UPLOADED: &str = "No file uploaded";
pub const NO_FILE_SELECTED: &str = "No file selected";
const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Assistant,
    pub uploads: Arc<UploadStore>,
    pub sessions: SessionStore,
    pub metrics: Arc<AppMetrics>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
    model: ModelStatus,
    faq_entries: usize,
    active_sessions: usize,
}

#[derive(Debug, Serialize)]
struct ModelStatus {
    name: String,
    loaded: bool,
}

/// Wires the shared application context around the given adapters.
pub fn build_state(settings: &Settings, adapters: Adapters) -> Result<ApiState> {
    let faqs = match settings.faq_path.as_ref() {
        Some(path) => FaqTable::from_json_file(path)?,
        None => FaqTable::builtin(),
    }
    .with_threshold(settings.faq_threshold);

    let uploads = UploadStore::open(&settings.upload_dir)?;
    let metrics = AppMetrics::shared();
    let assistant = Assistant::new(
        faqs,
        adapters,
        LazyModel::new(settings.qa_model.clone()),
        metrics.clone(),
    );

    tracing::info!(
        faq_entries = assistant.faqs().len(),
        faq_threshold = assistant.faqs().threshold(),
        upload_dir = %uploads.root().display(),
        qa_model = %settings.qa_model,
        "application state ready"
    );

    Ok(ApiState {
        assistant,
        uploads: Arc::new(uploads),
        sessions: SessionStore::new(settings.session_ttl),
        metrics,
        max_upload_bytes: settings.max_upload_bytes,
    })
}

pub fn build_app(settings: &Settings) -> Result<Router> {
    let adapters = Adapters::live(&settings.adapters).context("failed to build adapters")?;
    let state = build_state(settings, adapters)?;
    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/chatbot", get(chatbot))
        .route("/static/script.js", get(script))
        .route("/ask", post(ask))
        .route("/upload", post(upload))
        .route("/read", get(read))
        .route("/read/raw", get(read_raw))
        .route("/ask_document", post(ask_document))
        .route("/health", get(health))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(pages::INDEX_HTML)
}

async fn chatbot() -> Html<&'static str> {
    Html(pages::CHATBOT_HTML)
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        pages::SCRIPT_JS,
    )
}

async fn ask(
    State(state): State<ApiState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Json<AskResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable ask payload, treating as empty");
            AskRequest::default()
        }
    };

    let reply = state.assistant.ask(&request.question).await;
    Json(AskResponse {
        response: reply.text(),
    })
}

async fn upload(
    State(state): State<ApiState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(mut multipart) = multipart else {
        return plain_text(NO_FILE_UPLOADED);
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return plain_text(NO_FILE_UPLOADED),
            Err(err) => return (err.status(), err.body_text()).into_response(),
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.trim().is_empty() {
            return plain_text(NO_FILE_SELECTED);
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return (err.status(), err.body_text()).into_response(),
        };

        let stored = match state.uploads.save(&filename, &bytes).await {
            Ok(stored) => stored,
            Err(UploadError::EmptyFilename | UploadError::InvalidFilename(_)) => {
                return plain_text(NO_FILE_SELECTED);
            }
            Err(err) => {
                tracing::error!(error = %err, "upload write failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error saving file: {err}"),
                )
                    .into_response();
            }
        };

        state.metrics.inc_upload();
        let set_cookie = state.sessions.record_upload(&headers, &stored);

        let mut response = Redirect::to("/read").into_response();
        if let Some(cookie) = set_cookie.and_then(|value| HeaderValue::from_str(&value).ok()) {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        return response;
    }
}

async fn read(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    match session_document(&state, &headers).await {
        Ok(text) => Html(pages::render_read_page(&text)).into_response(),
        Err(message) => plain_text(&message),
    }
}

async fn read_raw(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    match session_document(&state, &headers).await {
        Ok(text) => plain_text(&text),
        Err(message) => plain_text(&message),
    }
}

async fn ask_document(
    State(state): State<ApiState>,
    headers: HeaderMap,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Json<DocumentAnswer> {
    let question = payload
        .map(|Json(request)| request.question)
        .unwrap_or_default();

    let text = match session_document(&state, &headers).await {
        Ok(text) => text,
        Err(message) => {
            return Json(DocumentAnswer {
                response: message,
                score: 0.0,
            })
        }
    };

    let assistant = state.assistant.clone();
    let answer = tokio::task::spawn_blocking(move || assistant.ask_document(&question, &text))
        .await
        .unwrap_or_else(|err| {
            tracing::error!(error = %err, "document QA task failed");
            DocumentAnswer {
                response: deskmate_agents::NO_DOCUMENT_ANSWER.to_string(),
                score: 0.0,
            }
        });
    Json(answer)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let model = state.assistant.model();
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        model: ModelStatus {
            name: model.name().to_string(),
            loaded: model.is_loaded(),
        },
        faq_entries: state.assistant.faqs().len(),
        active_sessions: state.sessions.len(),
    };
    (StatusCode::OK, Json(payload))
}

/// Extracted text of the caller's uploaded file. `Err` carries the user-facing message.
async fn session_document(state: &ApiState, headers: &HeaderMap) -> Result<String, String> {
    let Some(filename) = state.sessions.uploaded_file(headers) else {
        return Err(NO_FILE_UPLOADED.to_string());
    };

    let uploads = state.uploads.clone();
    let result = tokio::task::spawn_blocking(move || uploads.read_text(&filename)).await;
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "failed reading uploaded file");
            Err(format!("Error reading file: {err}"))
        }
        Err(err) => {
            tracing::error!(error = %err, "file read task failed");
            Err(format!("Error reading file: {err}"))
        }
    }
}

fn plain_text(body: &str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body.to_string(),
    )
        .into_response()
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(
            "default-src 'self'; style-src 'self' 'unsafe-inline'; frame-ancestors 'none'; base-uri 'none'",
        ),
    );

    response
}
