//! # 会话认证中间件
//!
//! 校验请求 cookie 中的 `auth_token`，未通过时软重定向到登录页，
//! 而不是返回错误载荷

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::management::response;
use crate::management::server::AppState;

/// cookie 中会话令牌的名称
const AUTH_COOKIE: &str = "auth_token";

/// Axum 会话认证中间件
pub async fn session_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| cookie_value(raw, AUTH_COOKIE));

    match token {
        Some(token) if state.auth.verify_auth_token(&token) => next.run(request).await,
        _ => {
            warn!("未认证的管理接口访问: {}", request.uri().path());
            response::redirect_to_root()
        }
    }
}

/// 从 Cookie 头中取出指定名称的值
fn cookie_value(raw: &str, name: &str) -> Option<String> {
    raw.split(';')
        .filter_map(|pair| pair.split_once('='))
        .find_map(|(key, value)| (key.trim() == name).then(|| value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_token() {
        let raw = "theme=dark; auth_token=abc123; lang=zh";
        assert_eq!(cookie_value(raw, "auth_token"), Some("abc123".to_string()));
    }

    #[test]
    fn cookie_value_handles_missing_token() {
        assert_eq!(cookie_value("theme=dark", "auth_token"), None);
        assert_eq!(cookie_value("", "auth_token"), None);
    }

    #[test]
    fn cookie_value_does_not_match_prefix_names() {
        let raw = "xauth_token=bad; auth_token=good";
        assert_eq!(cookie_value(raw, "auth_token"), Some("good".to_string()));
    }
}
