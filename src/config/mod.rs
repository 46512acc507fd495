//! # 配置管理模块
//!
//! 处理应用启动配置的加载、验证和环境变量覆盖

mod app_config;
mod manager;

pub use app_config::{AppConfig, AuthConfig, DatabaseConfig, ServerConfig};
pub use manager::ConfigManager;

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> crate::error::Result<()> {
    // 验证服务器配置
    if config.server.port == 0 {
        return Err(crate::error::AdminError::config(format!(
            "无效的服务器端口: {}",
            config.server.port
        )));
    }

    // 验证数据库配置
    if config.database.url.is_empty() {
        return Err(crate::error::AdminError::config("数据库URL不能为空"));
    }

    if config.database.max_connections == 0 {
        return Err(crate::error::AdminError::config("数据库最大连接数必须大于0"));
    }

    // 验证管理端登录令牌
    if config.auth.admin_token.is_empty() {
        return Err(crate::error::AdminError::config("管理端登录令牌不能为空"));
    }

    Ok(())
}
