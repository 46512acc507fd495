//! # 设置存取服务
//!
//! 对 `system_settings` 表的统一读写入口，多字段更新在单个事务内完成

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::warn;

use entity::system_settings::{self, Entity as SystemSettings};

use super::keys;
use super::types::{ScannerConfig, ScheduleConfig};
use crate::error::Result;

/// 设置写入接口
///
/// 密钥同步逻辑只依赖这个最小接口，方便在测试中替换存储
#[async_trait]
pub trait SettingsWriter: Send + Sync {
    /// 原子地更新一组设置字段
    async fn update_many(&self, fields: Vec<(String, JsonValue)>) -> Result<()>;
}

/// 设置存取服务
#[derive(Debug, Clone)]
pub struct SettingsService {
    db: DatabaseConnection,
}

impl SettingsService {
    /// 创建设置服务
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 读取单个设置项的 JSON 值
    pub async fn get_value(&self, key: &str) -> Result<Option<JsonValue>> {
        let row = SystemSettings::find()
            .filter(system_settings::Column::Key.eq(key))
            .one(&self.db)
            .await?;

        Ok(row.and_then(|model| decode_value(&model.key, &model.value)))
    }

    /// 读取当前 scanner 接入配置，缺失的键回退到默认值
    pub async fn scanner_config(&self) -> Result<ScannerConfig> {
        let mut values = self
            .load_values(&[
                keys::SCANNER_API_BASE_URL,
                keys::SCANNER_API_KEY,
                keys::SCANNER_API_TIMEOUT,
                keys::SCANNER_DEFAULT_LIMIT,
            ])
            .await?;

        let defaults = ScannerConfig::default();
        Ok(ScannerConfig {
            base_url: take(&mut values, keys::SCANNER_API_BASE_URL, defaults.base_url),
            api_key: take(&mut values, keys::SCANNER_API_KEY, defaults.api_key),
            timeout: take(&mut values, keys::SCANNER_API_TIMEOUT, defaults.timeout),
            default_limit: take(
                &mut values,
                keys::SCANNER_DEFAULT_LIMIT,
                defaults.default_limit,
            ),
        })
    }

    /// 读取当前定时任务配置，缺失的键回退到默认值
    pub async fn schedule_config(&self) -> Result<ScheduleConfig> {
        let mut values = self
            .load_values(&[
                keys::SCANNER_SYNC_ENABLED,
                keys::SCANNER_SYNC_DAILY_TIME,
                keys::SCANNER_SYNC_LIMIT,
                keys::SCANNER_SYNC_TYPE,
                keys::SCANNER_REVERIFY_ENABLED,
                keys::SCANNER_REVERIFY_DAILY_TIME,
                keys::SCANNER_REVERIFY_COUNT,
                keys::SCANNER_REVERIFY_STATUSES,
                keys::SCANNER_DELETE_ENABLED,
                keys::SCANNER_DELETE_DAILY_TIME,
                keys::SCANNER_DELETE_LIMIT,
            ])
            .await?;

        let defaults = ScheduleConfig::default();
        Ok(ScheduleConfig {
            sync_enabled: take(&mut values, keys::SCANNER_SYNC_ENABLED, defaults.sync_enabled),
            sync_time: take(
                &mut values,
                keys::SCANNER_SYNC_DAILY_TIME,
                defaults.sync_time,
            ),
            sync_limit: take(&mut values, keys::SCANNER_SYNC_LIMIT, defaults.sync_limit),
            sync_type: take(&mut values, keys::SCANNER_SYNC_TYPE, defaults.sync_type),
            reverify_enabled: take(
                &mut values,
                keys::SCANNER_REVERIFY_ENABLED,
                defaults.reverify_enabled,
            ),
            reverify_time: take(
                &mut values,
                keys::SCANNER_REVERIFY_DAILY_TIME,
                defaults.reverify_time,
            ),
            reverify_count: take(
                &mut values,
                keys::SCANNER_REVERIFY_COUNT,
                defaults.reverify_count,
            ),
            reverify_statuses: take(
                &mut values,
                keys::SCANNER_REVERIFY_STATUSES,
                defaults.reverify_statuses,
            ),
            delete_enabled: take(
                &mut values,
                keys::SCANNER_DELETE_ENABLED,
                defaults.delete_enabled,
            ),
            delete_time: take(
                &mut values,
                keys::SCANNER_DELETE_DAILY_TIME,
                defaults.delete_time,
            ),
            delete_limit: take(&mut values, keys::SCANNER_DELETE_LIMIT, defaults.delete_limit),
        })
    }

    /// 批量读取键值
    async fn load_values(&self, wanted: &[&str]) -> Result<HashMap<String, JsonValue>> {
        let rows = SystemSettings::find()
            .filter(system_settings::Column::Key.is_in(wanted.iter().copied()))
            .all(&self.db)
            .await?;

        let mut values = HashMap::with_capacity(rows.len());
        for row in rows {
            if let Some(value) = decode_value(&row.key, &row.value) {
                values.insert(row.key, value);
            }
        }
        Ok(values)
    }
}

#[async_trait]
impl SettingsWriter for SettingsService {
    async fn update_many(&self, fields: Vec<(String, JsonValue)>) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().naive_utc();

        for (key, value) in fields {
            let encoded = serde_json::to_string(&value)?;
            let existing = SystemSettings::find()
                .filter(system_settings::Column::Key.eq(&key))
                .one(&txn)
                .await?;

            if let Some(model) = existing {
                let mut active: system_settings::ActiveModel = model.into();
                active.value = Set(encoded);
                active.updated_at = Set(now);
                active.update(&txn).await?;
            } else {
                let active = system_settings::ActiveModel {
                    key: Set(key),
                    value: Set(encoded),
                    description: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.insert(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

/// 解析存储的 JSON 文本，解析失败时丢弃该值
fn decode_value(key: &str, raw: &str) -> Option<JsonValue> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("设置项 {} 的值无法解析为 JSON，将按缺失处理: {}", key, err);
            None
        }
    }
}

/// 从已加载的键值中取出目标类型的值，缺失或类型不符时回退默认值
fn take<T: DeserializeOwned>(
    values: &mut HashMap<String, JsonValue>,
    key: &str,
    default: T,
) -> T {
    values
        .remove(key)
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn take_falls_back_on_missing_key() {
        let mut values = HashMap::new();
        let out: u64 = take(&mut values, keys::SCANNER_API_TIMEOUT, 15);
        assert_eq!(out, 15);
    }

    #[test]
    fn take_falls_back_on_type_mismatch() {
        let mut values = HashMap::new();
        values.insert(keys::SCANNER_API_TIMEOUT.to_string(), json!("not-a-number"));
        let out: u64 = take(&mut values, keys::SCANNER_API_TIMEOUT, 15);
        assert_eq!(out, 15);
    }

    #[test]
    fn decode_value_rejects_invalid_json() {
        assert!(decode_value("K", "{broken").is_none());
        assert_eq!(decode_value("K", "42"), Some(json!(42)));
    }
}
