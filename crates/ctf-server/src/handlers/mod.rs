//! HTTP handlers
//!
//! Every JSON response uses the `{ success, data?, error?, message? }`
//! envelope. Errors are turned into the envelope by `ApiError`.

pub mod challenges;
pub mod ctfs;
pub mod files;
pub mod flags;

use serde::Serialize;

pub use challenges::{create_challenge, delete_challenge, get_challenge, list_challenges};
pub use ctfs::{create_ctf, delete_ctf, get_ctf, list_ctfs};
pub use files::{download_file, upload_file};
pub use flags::{create_flag, delete_flag, get_flag, list_flags, update_flag};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Non-empty query parameter or `None`.
pub(crate) fn required_param(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn health_check() -> &'static str {
    "OK - CTF Board Server"
}
