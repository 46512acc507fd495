//! # 配置管理器
//!
//! 统一的启动配置加载入口，支持环境变量覆盖

use std::collections::HashMap;
use std::env;
use std::path::Path;
use tracing::{debug, warn};

use super::AppConfig;
use crate::error::{AdminError, Result};

/// 环境变量覆盖前缀
const ENV_OVERRIDE_PREFIX: &str = "SCANNER_ADMIN_";

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 按约定路径加载配置
    ///
    /// 优先使用 `SCANNER_ADMIN_CONFIG_PATH`，否则按 `RUST_ENV` 选择
    /// `config/config.{env}.toml`；文件不存在时回退到默认配置
    pub fn load() -> Result<AppConfig> {
        let config_file = if let Ok(path) = env::var("SCANNER_ADMIN_CONFIG_PATH") {
            path
        } else {
            let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            format!("config/config.{env}.toml")
        };

        let mut config = if Path::new(&config_file).exists() {
            Self::load_config_file(Path::new(&config_file))?
        } else {
            warn!("配置文件不存在: {}, 使用默认配置", config_file);
            AppConfig::default()
        };

        Self::apply_env_overrides(&mut config, &Self::build_env_overrides())?;

        super::validate_config(&config)?;

        Ok(config)
    }

    /// 从指定文件加载配置（不应用环境变量覆盖）
    pub fn from_file(config_path: impl AsRef<Path>) -> Result<AppConfig> {
        let config = Self::load_config_file(config_path.as_ref())?;
        super::validate_config(&config)?;
        Ok(config)
    }

    /// 加载配置文件
    fn load_config_file(path: &Path) -> Result<AppConfig> {
        let config_content = std::fs::read_to_string(path).map_err(|e| {
            AdminError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        let config: AppConfig = toml::from_str(&config_content).map_err(|e| {
            AdminError::config_with_source(
                format!("TOML解析失败 - 配置文件: {}, 详细错误: {e}", path.display()),
                e,
            )
        })?;

        Ok(config)
    }

    /// 构建环境变量覆盖映射
    ///
    /// 例如: `SCANNER_ADMIN_SERVER_PORT` -> `server.port`
    fn build_env_overrides() -> HashMap<String, String> {
        let mut overrides = HashMap::new();

        for (key, value) in env::vars() {
            if let Some(config_key) = key.strip_prefix(ENV_OVERRIDE_PREFIX) {
                if config_key == "CONFIG_PATH" {
                    continue;
                }
                let config_path = config_key.to_lowercase().replace('_', ".");
                overrides.insert(config_path, value);
            }
        }

        debug!("发现 {} 个环境变量覆盖", overrides.len());
        overrides
    }

    /// 应用环境变量覆盖
    fn apply_env_overrides(
        config: &mut AppConfig,
        overrides: &HashMap<String, String>,
    ) -> Result<()> {
        for (path, value) in overrides {
            debug!(
                "应用环境变量覆盖: {} = {}",
                path,
                if path.contains("token") { "***" } else { value }
            );

            Self::apply_override_to_config(config, path, value)?;
        }
        Ok(())
    }

    /// 将环境变量覆盖应用到配置对象
    fn apply_override_to_config(config: &mut AppConfig, path: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => config.server.host = value.to_string(),
            ["server", "port"] => {
                config.server.port = value.parse().map_err(|e| {
                    AdminError::config_with_source(format!("无效的端口号: {value}"), e)
                })?;
            }
            ["database", "url"] => config.database.url = value.to_string(),
            ["database", "max", "connections"] | ["database", "maxconnections"] => {
                config.database.max_connections = value.parse().map_err(|e| {
                    AdminError::config_with_source(format!("无效的最大连接数: {value}"), e)
                })?;
            }
            ["auth", "admin", "token"] | ["auth", "admintoken"] => {
                config.auth.admin_token = value.to_string();
            }
            _ => {
                warn!("未知的配置路径，忽略环境变量覆盖: {}", path);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_paths_map_to_fields() {
        let mut config = AppConfig::default();
        let mut overrides = HashMap::new();
        overrides.insert("server.port".to_string(), "9191".to_string());
        overrides.insert("auth.admin.token".to_string(), "secret".to_string());

        ConfigManager::apply_env_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.server.port, 9191);
        assert_eq!(config.auth.admin_token, "secret");
    }

    #[test]
    fn invalid_port_override_is_rejected() {
        let mut config = AppConfig::default();
        let mut overrides = HashMap::new();
        overrides.insert("server.port".to_string(), "not-a-port".to_string());

        assert!(ConfigManager::apply_env_overrides(&mut config, &overrides).is_err());
    }
}
