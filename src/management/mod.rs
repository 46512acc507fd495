//! # 管理服务模块
//!
//! Axum HTTP 服务器与 `/api/scanner` 管理接口

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
