use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{PaymentOutcome, ProcessPaymentRequest};
use super::repo_types::Payment;
use super::services::PaymentService;
use crate::{
    auth::AuthUser,
    error::AppError,
    response::{ApiJson, ApiResponse},
    state::AppState,
};

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/pembayaran", post(process_payment))
        .route("/pembayaran/booking/:booking_id", get(payment_for_booking))
}

#[instrument(skip(svc, payload))]
pub async fn process_payment(
    State(svc): State<PaymentService>,
    user: AuthUser,
    ApiJson(payload): ApiJson<ProcessPaymentRequest>,
) -> Result<(StatusCode, ApiResponse<PaymentOutcome>), AppError> {
    let outcome = svc.process_payment(user.id, payload).await?;
    let message = if outcome.invoice_created {
        "payment successful"
    } else {
        "payment successful, invoice pending"
    };
    Ok((StatusCode::CREATED, ApiResponse::ok(outcome, message)))
}

#[instrument(skip(svc))]
pub async fn payment_for_booking(
    State(svc): State<PaymentService>,
    user: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<ApiResponse<Payment>, AppError> {
    let payment = svc.payment_for_booking(booking_id, user.id).await?;
    Ok(ApiResponse::ok(payment, "payment fetched"))
}
