use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::CreateBookingRequest;
use super::repo_types::Booking;
use super::services::BookingService;
use crate::{
    auth::{AdminUser, AuthUser},
    error::AppError,
    response::{ApiJson, ApiResponse},
    state::AppState,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/booking", post(create_booking))
        .route("/booking/saya", get(my_bookings))
        .route("/booking/:id", get(get_booking).delete(cancel_booking))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/booking", get(all_bookings))
}

#[instrument(skip(svc, payload))]
pub async fn create_booking(
    State(svc): State<BookingService>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, ApiResponse<Booking>), AppError> {
    let booking = svc.create_booking(user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(booking, "booking created"),
    ))
}

#[instrument(skip(svc))]
pub async fn my_bookings(
    State(svc): State<BookingService>,
    user: AuthUser,
) -> Result<ApiResponse<Vec<Booking>>, AppError> {
    let bookings = svc.my_bookings(user.id).await?;
    Ok(ApiResponse::ok(bookings, "booking history fetched"))
}

#[instrument(skip(svc))]
pub async fn get_booking(
    State(svc): State<BookingService>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Booking>, AppError> {
    let booking = svc.get_booking(id, user).await?;
    Ok(ApiResponse::ok(booking, "booking fetched"))
}

#[instrument(skip(svc))]
pub async fn cancel_booking(
    State(svc): State<BookingService>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Booking>, AppError> {
    let booking = svc.cancel_booking(id, user.id).await?;
    Ok(ApiResponse::ok(booking, "booking cancelled"))
}

#[instrument(skip(svc))]
pub async fn all_bookings(
    State(svc): State<BookingService>,
    AdminUser(_admin_id): AdminUser,
) -> Result<ApiResponse<Vec<Booking>>, AppError> {
    let bookings = svc.all_bookings().await?;
    Ok(ApiResponse::ok(bookings, "all bookings fetched"))
}
