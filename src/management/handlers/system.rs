//! # 系统信息处理器

use axum::Json;
use serde_json::{Value as JsonValue, json};

/// 根路径处理器（管理API信息）
pub async fn root_handler() -> Json<JsonValue> {
    Json(json!({
        "success": true,
        "message": "Scanner Admin API",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Ping 处理器
pub async fn ping_handler() -> &'static str {
    "pong"
}
