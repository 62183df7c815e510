use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::InvoiceDetails;
use super::repo_types::Invoice;
use super::services::InvoiceService;
use crate::{
    auth::{AdminUser, AuthUser},
    error::AppError,
    response::ApiResponse,
    state::AppState,
};

pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/invoice/:id", get(get_invoice))
        .route("/invoice/download/:number", get(get_invoice_by_number))
        .route("/admin/invoice/:booking_id", post(create_invoice))
}

#[instrument(skip(svc))]
pub async fn get_invoice(
    State(svc): State<InvoiceService>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<InvoiceDetails>, AppError> {
    let invoice = svc.get_invoice(id, user).await?;
    Ok(ApiResponse::ok(invoice, "invoice fetched"))
}

#[instrument(skip(svc))]
pub async fn get_invoice_by_number(
    State(svc): State<InvoiceService>,
    user: AuthUser,
    Path(number): Path<String>,
) -> Result<ApiResponse<InvoiceDetails>, AppError> {
    let invoice = svc.get_invoice_by_number(&number, user).await?;
    Ok(ApiResponse::ok(invoice, "invoice fetched"))
}

#[instrument(skip(svc))]
pub async fn create_invoice(
    State(svc): State<InvoiceService>,
    AdminUser(_admin_id): AdminUser,
    Path(booking_id): Path<Uuid>,
) -> Result<(StatusCode, ApiResponse<Invoice>), AppError> {
    let invoice = svc.create_for_paid_booking(booking_id).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(invoice, "invoice created")))
}
