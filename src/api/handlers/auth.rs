use crate::api::error::AppError;
use crate::api::notify::{Notice, flash_redirect};
use crate::entities::{prelude::*, users};
use crate::utils::auth::create_jwt;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use axum::{Json, extract::State, response::Response};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(payload): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = Users::find()
        .filter(users::Column::Username.eq(payload.username))
        .one(&state.db)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized("Invalid credentials".to_string()))?;

    let argon2 = Argon2::default();
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    argon2
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let token = create_jwt(&user.id, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(AuthResponse { token }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 303, description = "Logged out, redirected home")
    ),
    tag = "auth"
)]
pub async fn logout() -> Response {
    // Sessions are stateless JWTs; the client drops the token.
    flash_redirect("/", &[Notice::success("Logged out.")])
}
