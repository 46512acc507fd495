//! # 会话令牌验证服务

use crate::config::AuthConfig;

/// 会话令牌验证服务
///
/// 管理端所有接口都要求 cookie 中携带有效的 `auth_token`
#[derive(Debug, Clone)]
pub struct AuthService {
    admin_token: String,
}

impl AuthService {
    /// 从认证配置创建服务
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            admin_token: config.admin_token.clone(),
        }
    }

    /// 验证会话令牌
    ///
    /// 未配置令牌时一律拒绝
    #[must_use]
    pub fn verify_auth_token(&self, token: &str) -> bool {
        !self.admin_token.is_empty() && token == self.admin_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(token: &str) -> AuthService {
        AuthService::new(&AuthConfig {
            admin_token: token.to_string(),
        })
    }

    #[test]
    fn valid_token_passes() {
        assert!(service("s3cret").verify_auth_token("s3cret"));
    }

    #[test]
    fn wrong_token_fails() {
        assert!(!service("s3cret").verify_auth_token("nope"));
    }

    #[test]
    fn empty_configured_token_rejects_everything() {
        assert!(!service("").verify_auth_token(""));
        assert!(!service("").verify_auth_token("anything"));
    }
}
