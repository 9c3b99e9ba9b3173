//! Supervisor API: login/signup and service lifecycle control (§6.4, port
//! 5000 by default). Every route but `login`/`signup`/`health`/`config`
//! requires `Authorization: Bearer <token>`.

use crate::server::error::AppError;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use sdb_auth::{AuthService, Supervisor};
use serde::Deserialize;
use serde_json::{json, Value as Json_};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct SupervisorState {
    pub auth: Arc<AuthService>,
    pub supervisor: Arc<Supervisor>,
    /// This supervisor's own binary, used to spawn its replacement on
    /// `/api/starter/servers/self-restart`.
    pub supervisor_binary: PathBuf,
    pub log_dir: PathBuf,
    /// Command-line arguments the replacement process should be launched
    /// with, mirroring how this one was started.
    pub restart_args: Vec<String>,
}

pub fn router(state: SupervisorState) -> Router {
    let protected = Router::new()
        .route("/api/starter/servers/status", get(servers_status))
        .route("/api/starter/servers/start", post(servers_start))
        .route("/api/starter/servers/stop", post(servers_stop))
        .route("/api/starter/servers/restart", post(servers_restart))
        .route("/api/starter/servers/self-restart", post(servers_self_restart))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer_token));

    Router::new()
        .route("/api/starter/login", post(login))
        .route("/api/starter/signup", post(signup))
        .route("/api/starter/health", get(health))
        .route("/api/starter/config", get(config))
        .merge(protected)
        .with_state(state)
}

async fn health() -> Json<Json_> {
    Json(json!({ "status": "ok" }))
}

async fn config(State(state): State<SupervisorState>) -> Json<Json_> {
    let services: Vec<String> = state.supervisor.status_all().into_iter().map(|(name, _)| name).collect();
    Json(json!({ "services": services }))
}

async fn require_bearer_token(
    State(state): State<SupervisorState>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;
    state.auth.authorize(token)?;
    Ok(next.run(request).await)
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(
    State(state): State<SupervisorState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Json_>, AppError> {
    let outcome = state.auth.login(&body.username, &body.password).await?;
    Ok(Json(json!({ "token": outcome.token, "gmLevel": outcome.gm_level })))
}

#[derive(Deserialize)]
struct SignupBody {
    username: String,
    password: String,
    email: String,
}

async fn signup(
    State(state): State<SupervisorState>,
    Json(body): Json<SignupBody>,
) -> Result<Json<Json_>, AppError> {
    let id = state.auth.signup(&body.username, &body.password, &body.email).await?;
    Ok(Json(json!({ "id": id })))
}

async fn servers_status(State(state): State<SupervisorState>) -> Json<Json_> {
    let statuses: Vec<Json_> = state
        .supervisor
        .status_all()
        .into_iter()
        .map(|(name, status)| json!({ "name": name, "running": status.running, "pids": status.pids }))
        .collect();
    Json(json!(statuses))
}

#[derive(Deserialize)]
struct ServiceName {
    name: String,
}

async fn servers_start(
    State(state): State<SupervisorState>,
    Json(body): Json<ServiceName>,
) -> Result<Json<Json_>, AppError> {
    let pid = state.supervisor.start(&body.name)?;
    Ok(Json(json!({ "pid": pid })))
}

async fn servers_stop(
    State(state): State<SupervisorState>,
    Json(body): Json<ServiceName>,
) -> Result<StatusCode, AppError> {
    state.supervisor.stop(&body.name)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn servers_restart(
    State(state): State<SupervisorState>,
    Json(body): Json<ServiceName>,
) -> Result<Json<Json_>, AppError> {
    let pid = state.supervisor.restart(&body.name)?;
    Ok(Json(json!({ "pid": pid })))
}

/// Spawns a replacement supervisor process, then exits this one (§4.8).
/// The response is sent before the delayed exit, so the caller always sees
/// a reply even though the process that sent it is about to terminate.
async fn servers_self_restart(State(state): State<SupervisorState>) -> Result<Json<Json_>, AppError> {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = state
            .supervisor
            .self_restart(&state.supervisor_binary, &state.log_dir, &state.restart_args)
        {
            log::error!("self-restart failed: {e}");
        }
    });
    Ok(Json(json!({ "status": "restarting" })))
}
