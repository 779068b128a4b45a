//! HTTP surface of the service.
//!
//! | route | operation |
//! |---|---|
//! | `POST /iniciar_ag` | start a session from a parameter document |
//! | `GET /obtener_progreso/{id}` | poll progress |
//! | `GET /obtener_resultado/{id}` | fetch the result of a completed session |
//! | `POST /cancelar/{id}` | cancel a running session |
//! | `DELETE /sesiones/{id}` | forget a session |

use crate::models::{ParameterDocument, ValidationError};
use crate::service::models::{ErrorResponse, StartResponse};
use crate::service::{Error, Service};
use axum::{
    Router,
    extract::{Json, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "Sesión no encontrada".to_string()),
            Error::NotReady(_) => (StatusCode::NOT_FOUND, "Resultado no disponible".to_string()),
            Error::EngineFailure(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
            Error::Engine(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(message = "Request failed", err = %self.0);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/iniciar_ag", post(start))
        .route("/obtener_progreso/{id}", get(progress))
        .route("/obtener_resultado/{id}", get(result))
        .route("/cancelar/{id}", post(cancel))
        .route("/sesiones/{id}", delete(remove))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

async fn start(
    State(state): State<AppState>,
    document: Result<Json<ParameterDocument>, JsonRejection>,
) -> Result<Json<StartResponse>, ApiError> {
    // The rejection text carries the path of the offending field
    let Json(document) = document
        .map_err(|rejection| Error::Validation(ValidationError::malformed(rejection.body_text())))?;
    let session_id = state.service.start(&document).await?;
    Ok(Json(StartResponse {
        success: true,
        session_id,
    }))
}

async fn progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.progress(id).await?))
}

async fn result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.result(id).await?))
}

async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.cancel(id).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
