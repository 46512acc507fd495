//! # 密钥同步
//!
//! 把 scanner 返回的密钥记录映射进本地设置字段。这里是刻意保守的：
//! 上游返回空集时绝不覆盖现有配置

use serde_json::{Value as JsonValue, json};
use tracing::{info, warn};

use super::client::ScannerClient;
use super::types::{KeyAsset, KeyType, SyncSummary};
use crate::error::Result;
use crate::settings::{SettingsWriter, keys};

/// 标记可作为付费密钥的复验状态
const BILLABLE_STATUS: &str = "billable";

/// 将 scanner 返回的 key 集合写入本地设置
pub async fn apply_synced_keys<S>(
    settings: &S,
    items: &[KeyAsset],
    key_type: KeyType,
) -> Result<SyncSummary>
where
    S: SettingsWriter + ?Sized,
{
    let extracted: Vec<String> = items
        .iter()
        .map(|item| item.key.trim())
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect();

    if extracted.is_empty() {
        warn!("同步结果为空，保留现有 API_KEYS/PAID_KEY");
        return Ok(SyncSummary {
            synced: 0,
            applied: false,
            message: Some("no keys returned".to_string()),
            ..SyncSummary::default()
        });
    }

    let mut payload: Vec<(String, JsonValue)> = Vec::new();
    if key_type == KeyType::Paid {
        payload.push((keys::PAID_KEY.to_string(), json!(extracted[0])));
    } else {
        payload.push((keys::API_KEYS.to_string(), json!(extracted)));
        let paid_candidate = items.iter().find_map(|item| {
            let key = item.key.trim();
            if item.recheck_status.eq_ignore_ascii_case(BILLABLE_STATUS) && !key.is_empty() {
                Some(key.to_string())
            } else {
                None
            }
        });
        if let Some(paid_key) = paid_candidate {
            payload.push((keys::PAID_KEY.to_string(), json!(paid_key)));
        }
    }

    if payload.is_empty() {
        return Ok(SyncSummary {
            synced: extracted.len(),
            applied: false,
            message: Some("no payload generated".to_string()),
            ..SyncSummary::default()
        });
    }

    let updated_fields: Vec<String> = payload.iter().map(|(key, _)| key.clone()).collect();
    settings.update_many(payload).await?;
    info!("已应用 scanner 同步结果，更新字段 {}", updated_fields.join(", "));

    Ok(SyncSummary {
        synced: extracted.len(),
        applied: true,
        updated_fields: Some(updated_fields),
        ..SyncSummary::default()
    })
}

/// 从 scanner 拉取密钥并同步进本地设置
pub async fn sync_keys_from_scanner<S>(
    client: &ScannerClient,
    settings: &S,
    limit: u32,
    key_type: KeyType,
) -> Result<SyncSummary>
where
    S: SettingsWriter + ?Sized,
{
    let response = client.fetch_key_assets(limit, key_type).await?;

    let items: Vec<KeyAsset> = match response.get("items") {
        Some(JsonValue::Null) | None => Vec::new(),
        Some(value) => serde_json::from_value(value.clone())?,
    };

    let mut summary = apply_synced_keys(settings, &items, key_type).await?;
    summary.total = Some(
        response
            .get("total")
            .and_then(JsonValue::as_u64)
            .unwrap_or(items.len() as u64),
    );
    summary.key_type = Some(key_type);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// 记录所有写入调用的测试替身
    #[derive(Default)]
    struct RecordingWriter {
        calls: Mutex<Vec<Vec<(String, JsonValue)>>>,
    }

    #[async_trait]
    impl SettingsWriter for RecordingWriter {
        async fn update_many(&self, fields: Vec<(String, JsonValue)>) -> Result<()> {
            self.calls.lock().unwrap().push(fields);
            Ok(())
        }
    }

    impl RecordingWriter {
        fn calls(&self) -> Vec<Vec<(String, JsonValue)>> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn asset(key: &str, recheck_status: &str) -> KeyAsset {
        KeyAsset {
            key: key.to_string(),
            recheck_status: recheck_status.to_string(),
            ..KeyAsset::default()
        }
    }

    #[tokio::test]
    async fn empty_items_never_touch_settings() {
        let writer = RecordingWriter::default();
        let summary = apply_synced_keys(&writer, &[], KeyType::Valid).await.unwrap();

        assert_eq!(summary.synced, 0);
        assert!(!summary.applied);
        assert_eq!(summary.message.as_deref(), Some("no keys returned"));
        assert!(writer.calls().is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_keys_count_as_empty() {
        let writer = RecordingWriter::default();
        let items = vec![asset("   ", "valid"), asset("", "billable")];
        let summary = apply_synced_keys(&writer, &items, KeyType::Valid)
            .await
            .unwrap();

        assert!(!summary.applied);
        assert!(writer.calls().is_empty());
    }

    #[tokio::test]
    async fn paid_sync_stages_only_first_key() {
        let writer = RecordingWriter::default();
        let items = vec![asset("pk-1", "billable"), asset("pk-2", "billable")];
        let summary = apply_synced_keys(&writer, &items, KeyType::Paid)
            .await
            .unwrap();

        assert_eq!(summary.synced, 2);
        assert!(summary.applied);
        assert_eq!(
            summary.updated_fields,
            Some(vec![keys::PAID_KEY.to_string()])
        );

        let calls = writer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![(keys::PAID_KEY.to_string(), json!("pk-1"))]
        );
    }

    #[tokio::test]
    async fn valid_sync_preserves_order_and_skips_blanks() {
        let writer = RecordingWriter::default();
        let items = vec![
            asset(" k1 ", "free"),
            asset("", "free"),
            asset("k2", "pending"),
        ];
        let summary = apply_synced_keys(&writer, &items, KeyType::Valid)
            .await
            .unwrap();

        assert_eq!(summary.synced, 2);
        assert_eq!(
            summary.updated_fields,
            Some(vec![keys::API_KEYS.to_string()])
        );

        let calls = writer.calls();
        assert_eq!(
            calls[0],
            vec![(keys::API_KEYS.to_string(), json!(["k1", "k2"]))]
        );
    }

    #[tokio::test]
    async fn valid_sync_promotes_first_billable_key() {
        let writer = RecordingWriter::default();
        let items = vec![
            asset("k1", "Billable"),
            asset("k2", "free"),
            asset("k3", "billable"),
        ];
        let summary = apply_synced_keys(&writer, &items, KeyType::Valid)
            .await
            .unwrap();

        assert_eq!(summary.synced, 3);
        assert!(summary.applied);
        assert_eq!(
            summary.updated_fields,
            Some(vec![keys::API_KEYS.to_string(), keys::PAID_KEY.to_string()])
        );

        let calls = writer.calls();
        assert_eq!(
            calls[0],
            vec![
                (keys::API_KEYS.to_string(), json!(["k1", "k2", "k3"])),
                (keys::PAID_KEY.to_string(), json!("k1")),
            ]
        );
    }

    #[tokio::test]
    async fn billable_without_key_is_ignored() {
        let writer = RecordingWriter::default();
        let items = vec![asset("  ", "billable"), asset("k1", "free")];
        let summary = apply_synced_keys(&writer, &items, KeyType::Valid)
            .await
            .unwrap();

        assert_eq!(
            summary.updated_fields,
            Some(vec![keys::API_KEYS.to_string()])
        );
    }

    #[tokio::test]
    async fn spec_example_two_keys_one_billable() {
        let writer = RecordingWriter::default();
        let items = vec![asset("k1", "billable"), asset("k2", "free")];
        let summary = apply_synced_keys(&writer, &items, KeyType::Valid)
            .await
            .unwrap();

        assert_eq!(summary.synced, 2);
        assert!(summary.applied);
        assert_eq!(
            summary.updated_fields,
            Some(vec![keys::API_KEYS.to_string(), keys::PAID_KEY.to_string()])
        );
        let calls = writer.calls();
        assert_eq!(
            calls[0],
            vec![
                (keys::API_KEYS.to_string(), json!(["k1", "k2"])),
                (keys::PAID_KEY.to_string(), json!("k1")),
            ]
        );
    }
}
