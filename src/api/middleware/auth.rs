use crate::AppState;
use crate::entities::prelude::Users;
use crate::utils::auth::validate_jwt;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::EntityTrait;
use serde::Deserialize;

/// Authenticated staff member attached to the request by the gate below.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

#[derive(Deserialize)]
struct AuthQuery {
    token: Option<String>,
}

/// Staff gate for review endpoints. Anything short of an active staff
/// session is redirected to the login entry point instead of being
/// processed.
pub async fn staff_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let token = if let Some(t) = auth_header {
        Some(t)
    } else {
        // Try query parameter
        let query = req.uri().query().unwrap_or_default();
        serde_urlencoded::from_str::<AuthQuery>(query)
            .ok()
            .and_then(|q| q.token)
    };

    if let Some(token) = token {
        if let Ok(claims) = validate_jwt(&token, &state.config.jwt_secret) {
            let user = match Users::find_by_id(&claims.sub).one(&state.db).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::error!("Staff lookup failed: {}", e);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };

            if let Some(user) = user {
                if user.is_active && user.is_staff {
                    req.extensions_mut().insert(CurrentUser {
                        id: user.id,
                        username: user.username,
                    });
                    return next.run(req).await;
                }
            }
        }
    }

    Redirect::to("/auth/login").into_response()
}
