use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::{Component, PathBuf};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::practice::session::{SessionEvent, SessionSnapshot};
use crate::practice::{Format, PracticeOption, Selection};
use crate::state::{
    ContactForm, EventResponse, HealthStatus, PickerDefaults, PracticeOptions, PracticeState,
    SessionCreated,
};

pub type AppState = Arc<PracticeState>;

#[derive(Deserialize)]
struct OptionsParams {
    format: Option<String>,
}

const ALLOWED_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "mov", "avi", "webm", // Video
    "mp3", "wav", "flac", "aac", "ogg", "m4a", // Audio
    "jpg", "jpeg", "png", "gif", "webp", // Poster frames
];

pub fn create_router(state: AppState) -> Router {
    let dashboard = ServeDir::new(&state.config.dashboard_dir);

    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/catalog", get(get_catalog))
        .route("/api/options", get(get_options))
        .route("/api/contact", get(get_contact))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/start", post(start_session))
        .route("/api/sessions/:id/restart", post(restart_session))
        .route("/api/sessions/:id/tick", post(tick_session))
        .route("/api/sessions/:id/contact", post(toggle_contact))
        .route("/api/sessions/:id/splash", post(return_to_splash))
        .route("/media/*path", get(stream_clip))
        .fallback_service(dashboard)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(state: AppState) -> Result<()> {
    let port = state.config.port;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let display_addr = if addr.ip().is_unspecified() {
        format!("127.0.0.1:{}", port)
    } else {
        addr.to_string()
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("[SERVER] 🛼 REFCUE practice server running on http://{}", display_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("[SERVER] Could not listen for Ctrl+C: {}", e);
            }
        })
        .await
        .context("Server error")?;

    info!("[SERVER] Shut down.");
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn parse_session_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        clips: state.catalog.len(),
        sessions: state.sessions.len(),
    })
}

async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.clips().to_vec())
}

async fn get_options(
    State(state): State<AppState>,
    Query(params): Query<OptionsParams>,
) -> Response {
    let format = match params.format.as_deref() {
        None | Some("") => Format::default(),
        Some(raw) => match raw.parse::<Format>() {
            Ok(format) => format,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
    };

    let catalog = &state.catalog;
    let available = catalog.available_options(format);
    let topics = catalog.topic_pickers();

    let defaults = PickerDefaults {
        format: format.as_str().to_string(),
        topics: topics.iter().map(|t| t.value.clone()).collect(),
        options: available.iter().map(|o| o.as_str().to_string()).collect(),
    };

    Json(PracticeOptions {
        formats: catalog.format_pickers(),
        topics,
        options: available.iter().map(PracticeOption::picker).collect(),
        defaults,
    })
    .into_response()
}

async fn get_contact(State(state): State<AppState>) -> Json<ContactForm> {
    Json(ContactForm {
        url: state.config.contact_form_url(),
    })
}

// ─── Sessions ─────────────────────────────────────────────────────────────────

async fn create_session(State(state): State<AppState>, body: Bytes) -> Response {
    let (id, snapshot) = if body.iter().all(u8::is_ascii_whitespace) {
        state.sessions.create()
    } else {
        match serde_json::from_slice::<SessionSnapshot>(&body) {
            Ok(saved) => state.sessions.create_from(saved),
            Err(e) => {
                warn!("[SERVER] Rejected session snapshot: {}", e);
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid snapshot: {}", e));
            }
        }
    };

    (
        StatusCode::CREATED,
        Json(SessionCreated {
            id: id.to_string(),
            snapshot,
        }),
    )
        .into_response()
}

async fn get_session(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    let snapshot = parse_session_id(&id)
        .and_then(|id| state.sessions.with_session(&id, |session| session.snapshot()));
    match snapshot {
        Some(snapshot) => Json(snapshot).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Session not found"),
    }
}

async fn delete_session(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    match parse_session_id(&id) {
        Some(id) if state.sessions.remove(&id) => StatusCode::NO_CONTENT.into_response(),
        _ => error_response(StatusCode::NOT_FOUND, "Session not found"),
    }
}

/// Run one event against a session and answer with the effects and the new snapshot.
fn apply_event(state: &PracticeState, raw_id: &str, event: SessionEvent) -> Response {
    let Some(id) = parse_session_id(raw_id) else {
        return error_response(StatusCode::NOT_FOUND, "Session not found");
    };

    let outcome = state.sessions.with_session(&id, |session| {
        session
            .handle(event)
            .map(|effects| (effects, session.snapshot()))
    });

    match outcome {
        Some(Ok((effects, snapshot))) => Json(EventResponse { effects, snapshot }).into_response(),
        Some(Err(e)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        None => error_response(StatusCode::NOT_FOUND, "Session not found"),
    }
}

async fn start_session(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let selection = match serde_json::from_slice::<Selection>(&body) {
        Ok(selection) => selection,
        Err(e) => {
            warn!("[SERVER] Rejected selection: {}", e);
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid selection: {}", e));
        }
    };
    apply_event(&state, &id, SessionEvent::Start { selection })
}

async fn restart_session(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    apply_event(&state, &id, SessionEvent::Restart)
}

/// Ticks come straight from the player; anything unreadable counts as "no value".
async fn tick_session(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let event = SessionEvent::PositionTick {
        current_time: payload.get("currentTime").and_then(Value::as_f64),
        duration: payload.get("duration").and_then(Value::as_f64),
    };
    apply_event(&state, &id, event)
}

async fn toggle_contact(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    apply_event(&state, &id, SessionEvent::ToggleContact)
}

async fn return_to_splash(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    apply_event(&state, &id, SessionEvent::ReturnToSplash)
}

// ─── Media ────────────────────────────────────────────────────────────────────

/// Check a path requested under `/media` before it touches the filesystem.
fn validate_media_path(raw_path: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw_path);

    // 1. Relative, no traversal, nothing hidden along the way
    for component in path.components() {
        match component {
            Component::Normal(part) if part.to_string_lossy().starts_with('.') => {
                return Err("Access denied: Hidden path".to_string())
            }
            Component::Normal(_) => {}
            Component::ParentDir => {
                return Err("Access denied: Path traversal detected".to_string())
            }
            _ => return Err("Access denied: Path must be relative".to_string()),
        }
    }

    // 2. Must name a file
    if path.file_name().is_none() {
        return Err("Access denied: No file name".to_string());
    }

    // 3. Extension allowlist
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext {
        Some(e) if ALLOWED_EXTENSIONS.contains(&e.as_str()) => Ok(path),
        Some(e) => Err(format!("Access denied: Invalid file extension '.{}'", e)),
        None => Err("Access denied: No file extension provided".to_string()),
    }
}

async fn stream_clip(
    Path(raw_path): Path<String>,
    State(state): State<AppState>,
    req: Request,
) -> Response {
    let relative = match validate_media_path(&raw_path) {
        Ok(p) => p,
        Err(e) => {
            warn!("[SERVER] Media access denied for {:?}: {}", raw_path, e);
            return (StatusCode::FORBIDDEN, e).into_response();
        }
    };

    let path = state.config.content_root.join(relative);
    if !path.is_file() {
        return StatusCode::NOT_FOUND.into_response();
    }

    match ServeFile::new(path).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(err) => {
            error!("[SERVER] ServeFile error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
