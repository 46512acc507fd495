//! # 设置键名定义

/// scanner 基础 URL
pub const SCANNER_API_BASE_URL: &str = "SCANNER_API_BASE_URL";
/// scanner API 密钥
pub const SCANNER_API_KEY: &str = "SCANNER_API_KEY";
/// scanner 请求超时时间（秒）
pub const SCANNER_API_TIMEOUT: &str = "SCANNER_API_TIMEOUT";
/// UI 默认获取数量
pub const SCANNER_DEFAULT_LIMIT: &str = "SCANNER_DEFAULT_LIMIT";

/// 是否启用每日同步
pub const SCANNER_SYNC_ENABLED: &str = "SCANNER_SYNC_ENABLED";
/// 每日同步时间（HH:MM）
pub const SCANNER_SYNC_DAILY_TIME: &str = "SCANNER_SYNC_DAILY_TIME";
/// 每日同步数量上限
pub const SCANNER_SYNC_LIMIT: &str = "SCANNER_SYNC_LIMIT";
/// 同步的密钥类型（valid|paid）
pub const SCANNER_SYNC_TYPE: &str = "SCANNER_SYNC_TYPE";
/// 是否启用每日复验
pub const SCANNER_REVERIFY_ENABLED: &str = "SCANNER_REVERIFY_ENABLED";
/// 每日复验时间（HH:MM）
pub const SCANNER_REVERIFY_DAILY_TIME: &str = "SCANNER_REVERIFY_DAILY_TIME";
/// 每日复验数量
pub const SCANNER_REVERIFY_COUNT: &str = "SCANNER_REVERIFY_COUNT";
/// 复验状态过滤列表
pub const SCANNER_REVERIFY_STATUSES: &str = "SCANNER_REVERIFY_STATUSES";
/// 是否启用每日清理
pub const SCANNER_DELETE_ENABLED: &str = "SCANNER_DELETE_ENABLED";
/// 每日清理时间（HH:MM）
pub const SCANNER_DELETE_DAILY_TIME: &str = "SCANNER_DELETE_DAILY_TIME";
/// 每日清理数量上限
pub const SCANNER_DELETE_LIMIT: &str = "SCANNER_DELETE_LIMIT";

/// 本地 Gemini API 密钥列表
pub const API_KEYS: &str = "API_KEYS";
/// 本地付费密钥
pub const PAID_KEY: &str = "PAID_KEY";
