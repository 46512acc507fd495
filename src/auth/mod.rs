//! # 认证模块
//!
//! 管理端会话 cookie 的验证

mod service;

pub use service::AuthService;
