use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::dto::{
    AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest, UpdateProfileRequest,
};
use super::jwt::AuthUser;
use super::services::AuthService;
use crate::{
    error::AppError,
    response::{ApiJson, ApiResponse},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/daftar", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/profil", get(get_profile).put(update_profile))
}

#[instrument(skip_all)]
pub async fn register(
    State(svc): State<AuthService>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, ApiResponse<AuthResponse>), AppError> {
    let auth = svc.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(auth, "registration successful"),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(svc): State<AuthService>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let auth = svc.login(payload).await?;
    Ok(ApiResponse::ok(auth, "login successful"))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(svc): State<AuthService>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let auth = svc.refresh(&payload.refresh_token).await?;
    Ok(ApiResponse::ok(auth, "token refreshed"))
}

#[instrument(skip(svc))]
pub async fn get_profile(
    State(svc): State<AuthService>,
    user: AuthUser,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let profile = svc.profile(user.id).await?;
    Ok(ApiResponse::ok(profile.into(), "profile fetched"))
}

#[instrument(skip(svc, payload))]
pub async fn update_profile(
    State(svc): State<AuthService>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let profile = svc.update_profile(user.id, payload).await?;
    Ok(ApiResponse::ok(profile.into(), "profile updated"))
}
