use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::client::RiskApi;
use super::registry::SessionId;
use super::service::{ScreeningService, ScreeningServiceError};
use crate::providers::{ProviderApi, ProviderError, ProviderId};

/// Router builder exposing the source catalog and screening session endpoints.
pub fn screening_router<R, P>(service: Arc<ScreeningService<R, P>>) -> Router
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    Router::new()
        .route("/api/v1/sources", get(sources_handler::<R, P>))
        .route("/api/v1/screening/sessions", post(open_handler::<R, P>))
        .route(
            "/api/v1/screening/sessions/:session_id",
            get(view_handler::<R, P>).delete(close_handler::<R, P>),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/toggle",
            post(toggle_handler::<R, P>),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/page",
            post(page_handler::<R, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenRequest {
    provider_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRequest {
    source: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageRequest {
    entry: usize,
    page: usize,
}

pub(crate) async fn sources_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
) -> Response
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    let payload = json!({ "sources": service.catalog().descriptors() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn open_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    axum::Json(request): axum::Json<OpenRequest>,
) -> Response
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    match service.open_session(ProviderId(request.provider_id)).await {
        Ok((session_id, view)) => {
            let payload = json!({
                "session_id": session_id,
                "session": view,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    match service.session_view(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<ToggleRequest>,
) -> Response
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    match service.toggle(&SessionId(session_id), &request.source) {
        Ok(outcome) => {
            let status = if outcome.run.is_some() {
                StatusCode::ACCEPTED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(outcome.view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn page_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<PageRequest>,
) -> Response
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    match service.set_page(&SessionId(session_id), request.entry, request.page) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn close_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    match service.close(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScreeningServiceError) -> Response {
    let status = match &error {
        ScreeningServiceError::UnknownSession(_)
        | ScreeningServiceError::Provider(ProviderError::NotFound(_)) => StatusCode::NOT_FOUND,
        ScreeningServiceError::UnknownSource(_)
        | ScreeningServiceError::NoMatchTable(_)
        | ScreeningServiceError::Provider(ProviderError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScreeningServiceError::Provider(ProviderError::Backend(_)) => StatusCode::BAD_GATEWAY,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
