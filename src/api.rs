//! HTTP routes for the panel

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{InvalidHeaderValue, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::manager::ControlVerb;
use crate::panel::{Panel, PanelError};
use crate::protocol::{ListRequest, LoginRequest, LoginResponse, ServiceRequest};
use crate::session::AuthError;
use crate::units::{ActiveState, ServiceEntry};

/// Maps panel failures onto status codes and plain-text bodies
#[derive(Debug)]
pub struct ApiError(PanelError);

impl From<PanelError> for ApiError {
    fn from(e: PanelError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        log::debug!("Rejected request body: {}", e);
        Self(PanelError::BadRequest("body"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            PanelError::Unauthorized => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            PanelError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad Request").into_response(),
            PanelError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            PanelError::Auth(AuthError::UnknownUser) => (StatusCode::UNAUTHORIZED, "login").into_response(),
            PanelError::Auth(AuthError::BadPassword) => (StatusCode::UNAUTHORIZED, "password").into_response(),
            PanelError::Command(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

/// Build the panel router
pub fn router(panel: Arc<Panel>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/services/list", post(list))
        .route("/services/status", post(status))
        .route("/services/stop", post(stop))
        .route("/services/start", post(start))
        .route("/services/restart", post(restart))
        .with_state(panel)
}

/// CORS policy admitting a single browser origin
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE]))
}

async fn login(
    State(panel): State<Arc<Panel>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;
    let key = panel.login(req.login.as_deref(), req.password.as_deref()).await?;
    Ok(Json(LoginResponse { key }))
}

async fn list(
    State(panel): State<Arc<Panel>>,
    body: Result<Json<ListRequest>, JsonRejection>,
) -> Result<Json<Vec<ServiceEntry>>, ApiError> {
    let Json(req) = body?;
    Ok(Json(panel.list(req.key.as_deref()).await?))
}

async fn status(
    State(panel): State<Arc<Panel>>,
    body: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<Json<ActiveState>, ApiError> {
    let Json(req) = body?;
    let active = panel
        .status(req.key.as_deref(), req.service_name.as_deref())
        .await?;
    Ok(Json(active))
}

async fn control(
    verb: ControlVerb,
    panel: &Panel,
    body: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = body?;
    panel
        .control(verb, req.key.as_deref(), req.service_name.as_deref())
        .await?;
    Ok(StatusCode::OK)
}

async fn stop(
    State(panel): State<Arc<Panel>>,
    body: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    control(ControlVerb::Stop, &panel, body).await
}

async fn start(
    State(panel): State<Arc<Panel>>,
    body: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    control(ControlVerb::Start, &panel, body).await
}

async fn restart(
    State(panel): State<Arc<Panel>>,
    body: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    control(ControlVerb::Restart, &panel, body).await
}
