use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use shipping_types::ports::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or incomplete integration credentials.
    #[error("{0}")]
    Configuration(String),

    /// Permission, ownership or signature failure.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Carrier call failed. `public` is only set outside production + live.
    #[error("ShippyPro error")]
    Upstream {
        method: String,
        status: Option<u16>,
        public: Option<Value>,
    },

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal(anyhow::anyhow!(e.to_string()))
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => status
                .filter(|s| (400..600).contains(s))
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    public: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let (msg, public) = match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                ("internal error".to_string(), None)
            }
            AppError::Upstream { public, .. } => ("ShippyPro error".to_string(), public),
            other => (other.to_string(), None),
        };

        let body = serde_json::to_string(&ErrorBody { error: msg, public })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}
