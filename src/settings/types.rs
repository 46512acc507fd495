//! # 运行时设置结构定义

use serde::{Deserialize, Serialize};

use crate::scanner::KeyType;

/// scanner 接入配置
///
/// 每次构建 scanner 客户端时都重新读取，保证总是使用最新值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// scanner 基础 URL，包含协议
    pub base_url: String,
    /// scanner API 密钥
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout: u64,
    /// UI 默认获取数量
    pub default_limit: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout: 15,
            default_limit: 50,
        }
    }
}

/// scanner 定时任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 是否启用每日同步
    pub sync_enabled: bool,
    /// 每日同步时间，格式 HH:MM
    pub sync_time: String,
    /// 每日同步数量上限
    pub sync_limit: u32,
    /// 同步的密钥类型
    pub sync_type: KeyType,
    /// 是否启用每日复验
    pub reverify_enabled: bool,
    /// 每日复验时间，格式 HH:MM
    pub reverify_time: String,
    /// 每日复验数量
    pub reverify_count: u32,
    /// 按 recheck_status 过滤复验（例如 pending,rate_limited）
    pub reverify_statuses: Vec<String>,
    /// 是否启用每日清理
    pub delete_enabled: bool,
    /// 每日清理时间，格式 HH:MM
    pub delete_time: String,
    /// 每日清理数量上限
    pub delete_limit: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            sync_enabled: false,
            sync_time: "03:00".to_string(),
            sync_limit: 100,
            sync_type: KeyType::Valid,
            reverify_enabled: false,
            reverify_time: "02:30".to_string(),
            reverify_count: 50,
            reverify_statuses: Vec::new(),
            delete_enabled: false,
            delete_time: "04:00".to_string(),
            delete_limit: 50,
        }
    }
}
