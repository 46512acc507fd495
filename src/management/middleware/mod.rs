//! # 管理服务中间件

pub mod auth;

pub use auth::session_auth;
