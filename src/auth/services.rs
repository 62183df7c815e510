use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest};
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use super::repo::UserRepository;
use super::repo_types::{NewUser, ProfileUpdate, Role, User, USERS_EMAIL_CONSTRAINT};
use crate::{error::AppError, state::AppState};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9+\-() ]+$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().chars().count() < 3 {
        return Err(AppError::validation("name must be at least 3 characters"));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), AppError> {
    if phone.trim().is_empty() || !PHONE_RE.is_match(phone) {
        return Err(AppError::validation("invalid phone number"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::validation("password must be at least 8 characters"));
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(AppError::validation("password must contain letters and digits"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), JwtKeys::from_ref(state))
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    fn issue_tokens(&self, user: User) -> Result<AuthResponse, AppError> {
        let access_token = self.keys.sign_access(user.id, user.role)?;
        let refresh_token = self.keys.sign_refresh(user.id, user.role)?;
        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, mut req: RegisterRequest) -> Result<AuthResponse, AppError> {
        req.email = req.email.trim().to_lowercase();
        if !is_valid_email(&req.email) {
            return Err(AppError::validation("invalid email"));
        }
        validate_name(&req.name)?;
        validate_phone(&req.phone)?;
        validate_password(&req.password)?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            warn!("email already registered");
            return Err(AppError::Conflict("email already registered".into()));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .users
            .create(NewUser {
                name: req.name.trim().to_string(),
                email: req.email,
                phone: req.phone.trim().to_string(),
                password_hash,
                role: Role::Customer,
            })
            .await
            .map_err(|e| {
                if e.violates(USERS_EMAIL_CONSTRAINT) {
                    AppError::Conflict("email already registered".into())
                } else {
                    e.into()
                }
            })?;

        info!(user_id = %user.id, "user registered");
        self.issue_tokens(user)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, mut req: LoginRequest) -> Result<AuthResponse, AppError> {
        req.email = req.email.trim().to_lowercase();
        if !is_valid_email(&req.email) {
            return Err(AppError::validation("invalid email"));
        }

        let Some(user) = self.users.find_by_email(&req.email).await? else {
            warn!("login unknown email");
            return Err(AppError::Unauthorized("invalid credentials".into()));
        };

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::Unauthorized("invalid credentials".into()));
        }

        info!(user_id = %user.id, "user logged in");
        self.issue_tokens(user)
    }

    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AppError> {
        let claims = self
            .keys
            .verify_refresh(refresh_token)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user not found".into()))?;
        self.issue_tokens(user)
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    #[instrument(skip(self, req))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let name = req.name.map(|n| n.trim().to_string());
        let phone = req.phone.map(|p| p.trim().to_string());
        if let Some(name) = &name {
            validate_name(name)?;
        }
        if let Some(phone) = &phone {
            validate_phone(phone)?;
        }
        let user = self
            .users
            .update_profile(user_id, ProfileUpdate { name, phone })
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}
