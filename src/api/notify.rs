use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One user-facing notification event produced by a workflow call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// 303 redirect carrying the notices in a short-lived cookie, the way a
/// server-rendered frontend consumes flash messages.
pub fn flash_redirect(location: &str, notices: &[Notice]) -> Response {
    let payload = serde_json::to_string(notices).unwrap_or_default();
    let encoded = utf8_percent_encode(&payload, NON_ALPHANUMERIC).to_string();

    (
        [(
            SET_COOKIE,
            format!(
                "{}={}; Path=/; Max-Age=60; SameSite=Lax",
                FLASH_COOKIE, encoded
            ),
        )],
        Redirect::to(location),
    )
        .into_response()
}
