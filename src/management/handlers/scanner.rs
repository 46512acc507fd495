//! # Scanner 管理接口处理器
//!
//! 校验请求载荷并把动作委托给 scanner 客户端、同步逻辑与设置存储

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::error;
use url::Url;

use crate::error::{AdminError, Result};
use crate::management::server::AppState;
use crate::scanner::{
    KeyType, PingResult, ScannerClient, SyncSummary, sync_keys_from_scanner,
};
use crate::settings::{ScheduleConfig, SettingsWriter, keys};

/// scanner 接入配置更新载荷
#[derive(Debug, Deserialize)]
pub struct ScannerConfigPayload {
    /// scanner 基础 URL，包含协议
    pub base_url: String,
    /// scanner API 密钥
    pub api_key: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// UI 默认获取数量
    #[serde(default = "default_fetch_limit")]
    pub default_limit: u32,
}

const fn default_timeout() -> u64 {
    15
}

const fn default_fetch_limit() -> u32 {
    50
}

impl ScannerConfigPayload {
    fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(AdminError::validation_field("base_url 不能为空", "base_url"));
        }
        let parsed = Url::parse(base_url).map_err(|_| {
            AdminError::validation_field("base_url 必须是包含协议的完整 URL", "base_url")
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AdminError::validation_field(
                "base_url 必须使用 http 或 https 协议",
                "base_url",
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(AdminError::validation_field("api_key 不能为空", "api_key"));
        }
        ensure_range("timeout", self.timeout, 1, 120)?;
        ensure_range("default_limit", u64::from(self.default_limit), 1, 1000)?;
        Ok(())
    }
}

/// 定时任务配置更新载荷
#[derive(Debug, Deserialize)]
pub struct ScannerSchedulePayload {
    #[serde(default)]
    pub sync_enabled: bool,
    /// 每日同步时间，格式 HH:MM
    #[serde(default = "default_sync_time")]
    pub sync_time: String,
    #[serde(default = "default_sync_limit")]
    pub sync_limit: u32,
    #[serde(default)]
    pub sync_type: KeyType,
    #[serde(default)]
    pub reverify_enabled: bool,
    /// 每日复验时间，格式 HH:MM
    #[serde(default = "default_reverify_time")]
    pub reverify_time: String,
    #[serde(default = "default_reverify_count")]
    pub reverify_count: u32,
    /// 可选，按 recheck_status 过滤（例如：pending,rate_limited）
    #[serde(default)]
    pub reverify_statuses: Option<Vec<String>>,
    #[serde(default)]
    pub delete_enabled: bool,
    /// 每日清理时间，格式 HH:MM
    #[serde(default = "default_delete_time")]
    pub delete_time: String,
    #[serde(default = "default_delete_limit")]
    pub delete_limit: u32,
}

fn default_sync_time() -> String {
    "03:00".to_string()
}

const fn default_sync_limit() -> u32 {
    100
}

fn default_reverify_time() -> String {
    "02:30".to_string()
}

const fn default_reverify_count() -> u32 {
    50
}

fn default_delete_time() -> String {
    "04:00".to_string()
}

const fn default_delete_limit() -> u32 {
    50
}

impl ScannerSchedulePayload {
    fn validate(&self) -> Result<()> {
        ensure_daily_time("sync_time", &self.sync_time)?;
        ensure_daily_time("reverify_time", &self.reverify_time)?;
        ensure_daily_time("delete_time", &self.delete_time)?;
        ensure_range("sync_limit", u64::from(self.sync_limit), 1, 1000)?;
        ensure_range("reverify_count", u64::from(self.reverify_count), 1, 1000)?;
        ensure_range("delete_limit", u64::from(self.delete_limit), 1, 1000)?;
        Ok(())
    }
}

/// 复验请求载荷
#[derive(Debug, Deserialize)]
pub struct ReverifyPayload {
    #[serde(default = "default_reverify_count")]
    pub count: u32,
    /// 可选，按 recheck_status 过滤
    #[serde(default)]
    pub statuses: Option<Vec<String>>,
}

impl ReverifyPayload {
    fn validate(&self) -> Result<()> {
        ensure_range("count", u64::from(self.count), 1, 1000)
    }
}

/// key-assets 查询参数
#[derive(Debug, Deserialize)]
pub struct KeyAssetsQuery {
    pub limit: Option<u32>,
    pub key_type: Option<KeyType>,
}

/// sync-now 查询参数
#[derive(Debug, Deserialize)]
pub struct SyncNowQuery {
    pub limit: Option<u32>,
    pub key_type: Option<KeyType>,
}

/// delete-invalid 查询参数
#[derive(Debug, Deserialize)]
pub struct DeleteInvalidQuery {
    pub limit: Option<u32>,
}

/// 获取 scanner 接入配置
///
/// API 密钥打码返回，最多暴露末尾 4 个字符
pub async fn get_scanner_config(State(state): State<AppState>) -> Result<Json<JsonValue>> {
    let config = state.settings.scanner_config().await?;
    Ok(Json(json!({
        "base_url": config.base_url,
        "api_key_masked": mask_api_key(&config.api_key),
        "timeout": config.timeout,
        "default_limit": config.default_limit,
    })))
}

/// 更新 scanner 接入配置
pub async fn update_scanner_config(
    State(state): State<AppState>,
    Json(payload): Json<ScannerConfigPayload>,
) -> Result<Json<JsonValue>> {
    payload.validate()?;

    let fields = vec![
        (
            keys::SCANNER_API_BASE_URL.to_string(),
            json!(payload.base_url.trim().trim_end_matches('/')),
        ),
        (keys::SCANNER_API_KEY.to_string(), json!(payload.api_key)),
        (keys::SCANNER_API_TIMEOUT.to_string(), json!(payload.timeout)),
        (
            keys::SCANNER_DEFAULT_LIMIT.to_string(),
            json!(payload.default_limit),
        ),
    ];

    match state.settings.update_many(fields).await {
        Ok(()) => Ok(Json(json!({ "success": true }))),
        Err(err @ AdminError::Validation { .. }) => Err(err),
        Err(err) => {
            error!("更新 scanner 配置失败: {err}");
            Err(AdminError::internal("更新 scanner 配置失败"))
        }
    }
}

/// 测试 scanner 连通性与授权
pub async fn ping_scanner(State(state): State<AppState>) -> Result<Json<PingResult>> {
    let client = ScannerClient::from_config(&state.settings.scanner_config().await?);
    Ok(Json(client.ping().await?))
}

/// 获取定时任务配置
pub async fn get_schedule_config(State(state): State<AppState>) -> Result<Json<ScheduleConfig>> {
    Ok(Json(state.settings.schedule_config().await?))
}

/// 更新定时任务配置，成功后触发调度器重载
pub async fn update_schedule_config(
    State(state): State<AppState>,
    Json(payload): Json<ScannerSchedulePayload>,
) -> Result<Json<JsonValue>> {
    payload.validate()?;

    let fields = vec![
        (
            keys::SCANNER_SYNC_ENABLED.to_string(),
            json!(payload.sync_enabled),
        ),
        (
            keys::SCANNER_SYNC_DAILY_TIME.to_string(),
            json!(payload.sync_time.trim()),
        ),
        (
            keys::SCANNER_SYNC_LIMIT.to_string(),
            json!(payload.sync_limit),
        ),
        (keys::SCANNER_SYNC_TYPE.to_string(), json!(payload.sync_type)),
        (
            keys::SCANNER_REVERIFY_ENABLED.to_string(),
            json!(payload.reverify_enabled),
        ),
        (
            keys::SCANNER_REVERIFY_DAILY_TIME.to_string(),
            json!(payload.reverify_time.trim()),
        ),
        (
            keys::SCANNER_REVERIFY_COUNT.to_string(),
            json!(payload.reverify_count),
        ),
        (
            keys::SCANNER_REVERIFY_STATUSES.to_string(),
            json!(payload.reverify_statuses.clone().unwrap_or_default()),
        ),
        (
            keys::SCANNER_DELETE_ENABLED.to_string(),
            json!(payload.delete_enabled),
        ),
        (
            keys::SCANNER_DELETE_DAILY_TIME.to_string(),
            json!(payload.delete_time.trim()),
        ),
        (
            keys::SCANNER_DELETE_LIMIT.to_string(),
            json!(payload.delete_limit),
        ),
    ];

    match state.settings.update_many(fields).await {
        Ok(()) => {
            state.scheduler.reload();
            Ok(Json(json!({ "success": true })))
        }
        Err(err @ AdminError::Validation { .. }) => Err(err),
        Err(err) => {
            error!("更新定时任务配置失败: {err}");
            Err(AdminError::internal("更新定时任务配置失败"))
        }
    }
}

/// 获取密钥资产列表（上游透传）
pub async fn fetch_key_assets(
    State(state): State<AppState>,
    Query(query): Query<KeyAssetsQuery>,
) -> Result<Json<JsonValue>> {
    if let Some(limit) = query.limit {
        ensure_range("limit", u64::from(limit), 1, 1000)?;
    }

    let config = state.settings.scanner_config().await?;
    let effective_limit = query.limit.unwrap_or(config.default_limit);
    let key_type = query.key_type.unwrap_or_default();

    let client = ScannerClient::from_config(&config);
    Ok(Json(client.fetch_key_assets(effective_limit, key_type).await?))
}

/// 触发复验（上游透传）
pub async fn trigger_reverify(
    State(state): State<AppState>,
    Json(payload): Json<ReverifyPayload>,
) -> Result<Json<JsonValue>> {
    payload.validate()?;

    let client = ScannerClient::from_config(&state.settings.scanner_config().await?);
    Ok(Json(
        client
            .trigger_reverify(payload.count, payload.statuses.as_deref())
            .await?,
    ))
}

/// 立即执行一次密钥同步
pub async fn sync_now(
    State(state): State<AppState>,
    Query(query): Query<SyncNowQuery>,
) -> Result<Json<SyncSummary>> {
    if let Some(limit) = query.limit {
        ensure_range("limit", u64::from(limit), 1, 1000)?;
    }

    let schedule = state.settings.schedule_config().await?;
    let effective_limit = query.limit.unwrap_or(schedule.sync_limit);
    let effective_type = query.key_type.unwrap_or(schedule.sync_type);

    let client = ScannerClient::from_config(&state.settings.scanner_config().await?);
    Ok(Json(
        sync_keys_from_scanner(
            &client,
            state.settings.as_ref(),
            effective_limit,
            effective_type,
        )
        .await?,
    ))
}

/// 删除无效密钥（上游透传）
pub async fn delete_invalid(
    State(state): State<AppState>,
    Query(query): Query<DeleteInvalidQuery>,
) -> Result<Json<JsonValue>> {
    if let Some(limit) = query.limit {
        ensure_range("limit", u64::from(limit), 1, 1000)?;
    }

    let schedule = state.settings.schedule_config().await?;
    let effective_limit = query.limit.unwrap_or(schedule.delete_limit);

    let client = ScannerClient::from_config(&state.settings.scanner_config().await?);
    Ok(Json(client.delete_invalid(effective_limit).await?))
}

/// API 密钥打码：长度大于 4 时保留末尾 4 位，否则返回空串
fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() > 4 {
        let last4: String = chars[chars.len() - 4..].iter().collect();
        format!("***{last4}")
    } else {
        String::new()
    }
}

/// 数值范围校验
fn ensure_range(field: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        return Err(AdminError::validation_field(
            format!("{field} 必须在 {min} 到 {max} 之间"),
            field,
        ));
    }
    Ok(())
}

/// HH:MM 格式校验
fn ensure_daily_time(field: &str, value: &str) -> Result<()> {
    chrono::NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        AdminError::validation_field(format!("{field} 必须是 HH:MM 格式"), field)
    })?;
    Ok(())
}
