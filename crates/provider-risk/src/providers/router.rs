use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::api::ProviderApi;
use super::directory::{ProviderDirectory, ProviderError, ProviderFilter};
use super::domain::ProviderId;
use super::validation::ProviderForm;

/// Router builder exposing provider listing and CRUD endpoints.
pub fn provider_router<P>(directory: Arc<ProviderDirectory<P>>) -> Router
where
    P: ProviderApi + 'static,
{
    Router::new()
        .route(
            "/api/v1/providers",
            get(list_handler::<P>).post(create_handler::<P>),
        )
        .route(
            "/api/v1/providers/:provider_id",
            get(detail_handler::<P>)
                .put(update_handler::<P>)
                .delete(delete_handler::<P>),
        )
        .with_state(directory)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ListQuery {
    search: String,
    country: String,
    page: Option<usize>,
}

pub(crate) async fn list_handler<P>(
    State(directory): State<Arc<ProviderDirectory<P>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    P: ProviderApi + 'static,
{
    if let Err(error) = directory.reload().await {
        return error_response(error);
    }

    let filter = ProviderFilter {
        search: query.search,
        country: query.country,
    };
    let page = directory.query(&filter, query.page.unwrap_or(1));
    let payload = json!({
        "providers": page.providers,
        "page": page.page,
        "total": page.total,
        "countries": directory.countries(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn detail_handler<P>(
    State(directory): State<Arc<ProviderDirectory<P>>>,
    Path(provider_id): Path<u64>,
) -> Response
where
    P: ProviderApi + 'static,
{
    match directory.lookup(ProviderId(provider_id)).await {
        Ok(provider) => (StatusCode::OK, axum::Json(provider)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<P>(
    State(directory): State<Arc<ProviderDirectory<P>>>,
    axum::Json(form): axum::Json<ProviderForm>,
) -> Response
where
    P: ProviderApi + 'static,
{
    match directory.add(&form).await {
        Ok(()) => {
            let payload = json!({ "providers": directory.snapshot() });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<P>(
    State(directory): State<Arc<ProviderDirectory<P>>>,
    Path(provider_id): Path<u64>,
    axum::Json(form): axum::Json<ProviderForm>,
) -> Response
where
    P: ProviderApi + 'static,
{
    match directory.edit(ProviderId(provider_id), &form).await {
        Ok(()) => {
            let payload = json!({ "providers": directory.snapshot() });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<P>(
    State(directory): State<Arc<ProviderDirectory<P>>>,
    Path(provider_id): Path<u64>,
) -> Response
where
    P: ProviderApi + 'static,
{
    match directory.remove(ProviderId(provider_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ProviderError) -> Response {
    match &error {
        ProviderError::Validation(fields) => {
            let payload = json!({
                "error": error.user_message(),
                "fields": fields,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ProviderError::Backend(_) => {
            let payload = json!({
                "error": error.user_message(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        ProviderError::NotFound(_) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
