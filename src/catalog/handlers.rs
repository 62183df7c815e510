use axum::{extract::State, routing::get, Router};
use tracing::instrument;

use super::repo_types::{Barber, ServiceOffering};
use crate::{error::AppError, response::ApiResponse, state::AppState};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/barber", get(list_barbers))
        .route("/layanan", get(list_services))
}

#[instrument(skip(state))]
pub async fn list_barbers(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Barber>>, AppError> {
    let barbers = state.catalog.list_barbers().await?;
    Ok(ApiResponse::ok(barbers, "barbers fetched"))
}

#[instrument(skip(state))]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ServiceOffering>>, AppError> {
    let services = state.catalog.list_services().await?;
    Ok(ApiResponse::ok(services, "services fetched"))
}
