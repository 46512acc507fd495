//! # API 响应结构
//!
//! 统一的 JSON 错误响应格式，以及把应用错误映射为 HTTP 状态码的出口

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{AdminError, NetworkError, ScannerError};

/// # 标准错误信息
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// # 标准错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorInfo,
    pub timestamp: DateTime<Utc>,
}

/// 未认证时的软重定向响应（302 → `/`）
///
/// 管理接口对未认证请求不返回错误载荷，保持与页面登录流程一致
#[must_use]
pub fn redirect_to_root() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

/// 错误对应的状态码与错误码
fn status_and_code(error: &AdminError) -> (StatusCode, &'static str) {
    match error {
        AdminError::Config { .. } => (StatusCode::BAD_REQUEST, "CONFIG_ERROR"),
        AdminError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        AdminError::Scanner(ScannerError::MissingApiKey) => {
            (StatusCode::BAD_REQUEST, "CONFIG_ERROR")
        }
        AdminError::Scanner(ScannerError::ApiError { status, .. }) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            "SCANNER_ERROR",
        ),
        AdminError::Network(_) => (StatusCode::BAD_GATEWAY, "NETWORK_ERROR"),
        AdminError::Database { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        AdminError::Serialization { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR")
        }
        AdminError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        AdminError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        AdminError::Context { source, .. } => status_and_code(source),
    }
}

/// 对外呈现的错误消息
///
/// 上游错误透传响应体；传输层错误只给出统一提示，不泄漏内部细节
fn public_message(error: &AdminError) -> String {
    match error {
        AdminError::Scanner(ScannerError::ApiError { detail, .. }) => detail.clone(),
        AdminError::Network(NetworkError::UpstreamUnreachable(message)) => message.clone(),
        AdminError::Network(NetworkError::Reqwest(_)) => "无法连接 scanner API".to_string(),
        AdminError::Context { source, .. } => public_message(source),
        other => other.to_string(),
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self);

        if status.is_server_error() {
            error!("管理接口内部错误: {self:?}");
        }

        let field = match &self {
            Self::Validation { field, .. } => field.clone(),
            _ => None,
        };

        let error_response = ErrorResponse {
            success: false,
            error: ErrorInfo {
                code: code.to_string(),
                message: public_message(&self),
                field,
            },
            timestamp: Utc::now(),
        };
        (status, Json(error_response)).into_response()
    }
}
