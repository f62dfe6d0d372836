//! HTTP JSON API module.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use devinfo_core::Reading;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::state::AppState;

/// Creates the web router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/properties", get(properties))
        .route("/api/get/:property", get(get_property))
        .route("/api/has/:property", get(has_property))
        .route("/api/monitor/:property", get(monitor_property))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Dispatcher error rendered as `{"error": "..."}`.
struct ApiError(devinfo_core::Error);

impl From<devinfo_core::Error> for ApiError {
    fn from(error: devinfo_core::Error) -> Self {
        Self(error)
    }
}

fn status_for(error: &devinfo_core::Error) -> StatusCode {
    use devinfo_core::Error;

    match error {
        Error::MissingProperty | Error::UnknownAction(_) => StatusCode::BAD_REQUEST,
        Error::UnknownProperty(_) => StatusCode::NOT_FOUND,
        Error::NotSupported { .. } => StatusCode::NOT_IMPLEMENTED,
        Error::SourceUnavailable { .. } | Error::Io(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct PropertyEntry {
    name: String,
    queryable: bool,
}

#[derive(Debug, Serialize)]
struct HasResponse {
    property: String,
    available: bool,
}

/// GET /api/properties - Capability map
async fn properties(State(state): State<Arc<AppState>>) -> Json<Vec<PropertyEntry>> {
    Json(
        state
            .properties()
            .into_iter()
            .map(|(property, queryable)| PropertyEntry {
                name: property.to_string(),
                queryable,
            })
            .collect(),
    )
}

/// GET /api/get/:property - Current value of a property
async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(property): Path<String>,
) -> Result<Json<Reading>, ApiError> {
    debug!("HTTP: get {}", property);
    Ok(Json(state.get(&property)?))
}

/// GET /api/has/:property - Whether a property is available
async fn has_property(
    State(state): State<Arc<AppState>>,
    Path(property): Path<String>,
) -> Result<Json<HasResponse>, ApiError> {
    let available = state.has(&property)?;
    Ok(Json(HasResponse {
        property,
        available,
    }))
}

/// GET /api/monitor/:property - Always rejected
async fn monitor_property(
    State(state): State<Arc<AppState>>,
    Path(property): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.monitor(&property)?;
    Ok(StatusCode::NO_CONTENT)
}
