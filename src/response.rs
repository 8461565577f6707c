use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rep_counter::ConfigError;
use serde::Serialize;

use crate::registry::RegistryError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    fn operational(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::CONFLICT, code, message)
    }

    pub fn too_many_requests(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::TOO_MANY_REQUESTS, code, message)
    }

    pub fn payload_too_large(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::PAYLOAD_TOO_LARGE, code, message)
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        match &value {
            ConfigError::UnknownExercise(_) => {
                AppError::bad_request("UNKNOWN_EXERCISE", &value.to_string())
            }
            ConfigError::AngleOutOfRange { .. } | ConfigError::InvalidConfiguration { .. } => {
                AppError::bad_request("INVALID_CONFIGURATION", &value.to_string())
            }
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        match &value {
            RegistryError::NotFound(_) => AppError::not_found(&value.to_string()),
            RegistryError::CapacityReached { .. } => {
                AppError::too_many_requests("TOO_MANY_SESSIONS", &value.to_string())
            }
            RegistryError::StaleFrame { .. } => {
                AppError::conflict("STALE_FRAME", &value.to_string())
            }
            RegistryError::FrameTooLarge { .. } => {
                AppError::payload_too_large("FRAME_TOO_LARGE", &value.to_string())
            }
            RegistryError::Config(err) => AppError::from(err.clone()),
        }
    }
}

/// `CatchPanicLayer` 的兜底响应，panic 内容不外泄
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "request handler panicked".to_string());
    AppError::internal(&detail).into_response()
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use uuid::Uuid;

    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn internal_error_is_redacted() {
        let resp = AppError::internal("session entry lock dropped").into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("session entry lock"));
        assert!(text.contains("Internal server error"));
    }

    #[tokio::test]
    async fn panic_becomes_internal_error_envelope() {
        let resp = panic_response(Box::new("landmark index overflow"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["message"], "Internal server error");
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let resp = AppError::bad_request("BAD_INPUT", "targetAngle missing").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "BAD_INPUT");
        assert_eq!(json["message"], "targetAngle missing");
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn config_errors_map_to_bad_request() {
        let err: AppError = "plank".parse::<rep_counter::Exercise>().unwrap_err().into();
        assert_eq!(err.code, "UNKNOWN_EXERCISE");

        let invalid = rep_counter::ExerciseConfig::with_target(rep_counter::Exercise::Squat, 170.0)
            .validate()
            .unwrap_err();
        let err: AppError = invalid.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_CONFIGURATION");
    }

    #[tokio::test]
    async fn registry_errors_map_to_status() {
        let id = Uuid::new_v4();
        let cases = [
            (RegistryError::NotFound(id), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                RegistryError::CapacityReached { max: 1 },
                StatusCode::TOO_MANY_REQUESTS,
                "TOO_MANY_SESSIONS",
            ),
            (
                RegistryError::StaleFrame {
                    sequence: 3,
                    last: 4,
                },
                StatusCode::CONFLICT,
                "STALE_FRAME",
            ),
            (
                RegistryError::FrameTooLarge { len: 100, max: 64 },
                StatusCode::PAYLOAD_TOO_LARGE,
                "FRAME_TOO_LARGE",
            ),
            (
                RegistryError::Config(rep_counter::ConfigError::AngleOutOfRange { value: 200.0 }),
                StatusCode::BAD_REQUEST,
                "INVALID_CONFIGURATION",
            ),
        ];

        for (err, status, code) in cases {
            let resp = AppError::from(err).into_response();
            assert_eq!(resp.status(), status);
            assert_eq!(body_json(resp).await["code"], code);
        }
    }
}
