//! Serve command - runs the content server.
//!
//! Handlers are thin: they pull the session token out of the cookie jar and
//! hand it to a function of the same name without the `handle_` prefix,
//! which does the work and builds the response.

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

use sitecms::{
    ContentStore, Edit, SystemClock, UpdateOutcome, Value,
    auth::{AccessPolicy, CredentialStore, Resource, Role, Session},
    backend::{
        Backend,
        database::{DbKind, InMemory, SqlxBackend},
    },
    history::AuditLog,
    store::load_defaults,
};

use crate::backend::{IN_MEMORY_FILE, create_backend, data_dir};
use crate::cli::ServeArgs;
use crate::session::{SessionData, SessionStore, SessionToken};

const SESSION_COOKIE: &str = "sitecms_session";

/// How long shutdown waits for in-flight content writes.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: ContentStore,
    credentials: CredentialStore,
    sessions: SessionStore,
}

/// Run the content server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(args).await?;

    let mut builder = ContentStore::builder(Arc::clone(&backend));
    if let Some(path) = &args.defaults {
        tracing::info!(path = %path.display(), "Loading default content from file");
        builder = builder.defaults(load_defaults(path).await?);
    }
    if let Some(origin) = &args.site_origin {
        builder = builder.site_origin(origin.clone());
    }
    let store = builder.build()?;
    store.initialize().await;

    let policy = Arc::new(store.policy().clone());
    let audit = AuditLog::new(Arc::clone(&backend), Arc::new(SystemClock));
    let credentials = CredentialStore::new(Arc::clone(&backend), audit, policy);
    if let (Some(user), Some(password)) = (&args.master_user, &args.master_password) {
        credentials.bootstrap_master(user, password).await?;
    }

    let state = AppState {
        store,
        credentials,
        sessions: SessionStore::new(),
    };
    let app = router(state.clone());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("sitecms content server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET    /health              - Health check");
    println!("  GET    /api/content         - Whole live content tree");
    println!("  GET    /api/content/{{path}}  - One field (?display=true follows image references)");
    println!("  PUT    /api/content         - Edit a field (requires login and edit mode)");
    println!("  POST   /api/login           - Log in");
    println!("  POST   /api/logout          - Log out");
    println!("  GET    /api/edit-mode       - Edit mode of the current session");
    println!("  PUT    /api/edit-mode       - Switch edit mode");
    println!("  GET    /api/history         - Content change history");
    println!("  DELETE /api/history         - Clear content history");
    println!("  GET    /api/audit           - Login/logout audit log");
    println!();
    println!("Press Ctrl+C to shutdown");

    let data_dir = data_dir(args);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;

            if tokio::time::timeout(FLUSH_TIMEOUT, state.store.flush())
                .await
                .is_err()
            {
                tracing::warn!("Timed out waiting for pending content writes");
            }

            // Save content on shutdown (only needed for InMemory backend)
            if let Some(in_memory) = state.store.backend().as_any().downcast_ref::<InMemory>() {
                let json_path = data_dir.join(IN_MEMORY_FILE);
                match in_memory.save_to_file(&json_path).await {
                    Ok(()) => tracing::info!(path = %json_path.display(), "Content saved"),
                    Err(e) => tracing::error!(error = %e, "Failed to save content"),
                }
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let (Ok(mut sigterm), Ok(mut sigint)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) else {
        tracing::error!("Failed to install signal handlers; waiting for Ctrl+C");
        let _ = tokio::signal::ctrl_c().await;
        return;
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/content", get(handle_get_tree).put(handle_update))
        .route("/api/content/{*path}", get(handle_get_field))
        .route("/api/login", post(handle_login))
        .route("/api/logout", post(handle_logout))
        .route("/api/edit-mode", get(handle_get_edit_mode).put(handle_set_edit_mode))
        .route("/api/history", get(handle_list_history).delete(handle_clear_history))
        .route("/api/audit", get(handle_list_audit))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Error body for every non-2xx API response.
#[derive(Debug, Serialize, Deserialize)]
struct ApiError {
    error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
        .into_response()
}

fn internal_error(e: sitecms::Error) -> Response {
    tracing::error!(error = %e, module = e.module(), "Request failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

fn not_logged_in() -> Response {
    api_error(StatusCode::UNAUTHORIZED, "login required")
}

fn session_token(cookies: &Cookies) -> Option<SessionToken> {
    cookies.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Looks up the session behind `token`, if it is still live.
async fn current_session(state: &AppState, token: Option<&str>) -> Option<SessionData> {
    state.sessions.get(token?).await
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    backend: String,
    ready: bool,
    sessions: usize,
}

/// Handler for GET /health
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend: &dyn Backend = state.store.backend().as_ref();
    let backend_type = if let Some(sqlx) = backend.as_any().downcast_ref::<SqlxBackend>() {
        match sqlx.kind() {
            DbKind::Sqlite => "sqlite",
            DbKind::Postgres => "postgres",
        }
    } else if backend.as_any().is::<InMemory>() {
        "inmemory"
    } else {
        "unknown"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        backend: backend_type.to_string(),
        ready: state.store.is_ready(),
        sessions: state.sessions.session_count().await,
    })
}

// ============================================================================
// Content
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct FieldQuery {
    #[serde(default)]
    display: bool,
}

/// Handler for GET /api/content
async fn handle_get_tree(State(state): State<AppState>) -> Json<Value> {
    Json(state.store.snapshot())
}

/// Handler for GET /api/content/{path}
async fn handle_get_field(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<FieldQuery>,
) -> Response {
    get_field(&state, &path, query.display)
}

fn get_field(state: &AppState, path: &str, display: bool) -> Response {
    let value = if display {
        state.store.resolve_display(path)
    } else {
        state.store.resolve(path)
    };
    match value {
        Some(value) => Json(value).into_response(),
        None => api_error(StatusCode::NOT_FOUND, format!("no content at '{path}'")),
    }
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    path: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    delete: bool,
    change_type: String,
    /// Write through image references, as the on-page image editor does.
    #[serde(default)]
    display: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct UpdateResponse {
    persisting: bool,
}

/// Handler for PUT /api/content
async fn handle_update(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<UpdateRequest>,
) -> Response {
    update(&state, session_token(&cookies).as_deref(), request).await
}

async fn update(state: &AppState, token: Option<&str>, request: UpdateRequest) -> Response {
    let Some(data) = current_session(state, token).await else {
        return not_logged_in();
    };
    if !data.edit_mode {
        return api_error(StatusCode::CONFLICT, "edit mode is off");
    }

    let edit = if request.delete {
        Edit::Delete
    } else {
        Edit::Set(request.value.unwrap_or_default())
    };
    let role = data.session.role;
    let outcome = if request.display {
        state
            .store
            .update_display(role, &request.path, edit, &request.change_type)
    } else {
        state
            .store
            .update(role, &request.path, edit, &request.change_type)
    };

    match outcome {
        UpdateOutcome::Applied { persisting } => Json(UpdateResponse { persisting }).into_response(),
        UpdateOutcome::Unauthorized => api_error(
            StatusCode::FORBIDDEN,
            format!("role {role} may not edit '{}'", request.path),
        ),
        UpdateOutcome::InvalidPath(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Handler for POST /api/login
async fn handle_login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<LoginRequest>,
) -> Response {
    match login(&state, &request).await {
        Ok((token, session)) => {
            let mut cookie = Cookie::new(SESSION_COOKIE, token);
            cookie.set_http_only(true);
            cookie.set_path("/");
            cookies.add(cookie);
            Json(session).into_response()
        }
        Err(response) => response,
    }
}

async fn login(
    state: &AppState,
    request: &LoginRequest,
) -> Result<(SessionToken, Session), Response> {
    let session = state
        .credentials
        .authenticate(&request.username, &request.password)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "invalid username or password"))?;
    let token = state.sessions.create_session(session.clone()).await;
    Ok((token, session))
}

/// Handler for POST /api/logout
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> StatusCode {
    if let Some(token) = session_token(&cookies) {
        logout(&state, &token).await;
        cookies.remove(Cookie::from(SESSION_COOKIE));
    }
    StatusCode::NO_CONTENT
}

async fn logout(state: &AppState, token: &str) {
    let Some(data) = state.sessions.destroy_session(token).await else {
        return;
    };
    if let Err(e) = state.credentials.logout(&data.session).await {
        tracing::warn!(error = %e, username = %data.session.username, "Failed to record logout");
    }
    state.store.set_edit_mode(state.sessions.any_editing().await);
}

// ============================================================================
// Edit mode
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct EditMode {
    enabled: bool,
}

/// Handler for GET /api/edit-mode
async fn handle_get_edit_mode(State(state): State<AppState>, cookies: Cookies) -> Json<EditMode> {
    let data = current_session(&state, session_token(&cookies).as_deref()).await;
    Json(EditMode {
        enabled: data.is_some_and(|data| data.edit_mode),
    })
}

/// Handler for PUT /api/edit-mode
async fn handle_set_edit_mode(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<EditMode>,
) -> Response {
    set_edit_mode(&state, session_token(&cookies).as_deref(), request).await
}

async fn set_edit_mode(state: &AppState, token: Option<&str>, request: EditMode) -> Response {
    let (Some(token), Some(data)) = (token, current_session(state, token).await) else {
        return not_logged_in();
    };
    if request.enabled && !can_edit_anything(state.store.policy(), data.session.role) {
        return api_error(StatusCode::FORBIDDEN, "role may not edit content");
    }
    let Some(any_editing) = state.sessions.set_edit_mode(token, request.enabled).await else {
        return not_logged_in();
    };
    state.store.set_edit_mode(any_editing);
    Json(request).into_response()
}

fn can_edit_anything(policy: &AccessPolicy, role: Role) -> bool {
    [Resource::Content, Resource::JobListings]
        .into_iter()
        .any(|resource| policy.can_edit(resource, role))
}

// ============================================================================
// History and audit
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClearedResponse {
    removed: usize,
}

/// Handler for GET /api/history
async fn handle_list_history(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<HistoryQuery>,
) -> Response {
    list_history(&state, session_token(&cookies).as_deref(), query.limit).await
}

async fn list_history(state: &AppState, token: Option<&str>, limit: Option<usize>) -> Response {
    if current_session(state, token).await.is_none() {
        return not_logged_in();
    }
    match state.store.history().list(limit).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Handler for DELETE /api/history
async fn handle_clear_history(State(state): State<AppState>, cookies: Cookies) -> Response {
    clear_history(&state, session_token(&cookies).as_deref()).await
}

async fn clear_history(state: &AppState, token: Option<&str>) -> Response {
    let Some(data) = current_session(state, token).await else {
        return not_logged_in();
    };
    match state.store.clear_history(data.session.role).await {
        Ok(removed) => Json(ClearedResponse { removed }).into_response(),
        Err(e) if e.is_permission_denied() => api_error(StatusCode::FORBIDDEN, e.to_string()),
        Err(e) => internal_error(e),
    }
}

/// Handler for GET /api/audit
async fn handle_list_audit(State(state): State<AppState>, cookies: Cookies) -> Response {
    list_audit(&state, session_token(&cookies).as_deref()).await
}

async fn list_audit(state: &AppState, token: Option<&str>) -> Response {
    let Some(data) = current_session(state, token).await else {
        return not_logged_in();
    };
    if let Err(e) = state
        .store
        .policy()
        .require(Resource::Credentials, data.session.role)
    {
        return api_error(StatusCode::FORBIDDEN, e.to_string());
    }
    match state.credentials.audit().recent().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => internal_error(e),
    }
}
