//! 设置存取服务集成测试

use migration::{Migrator, MigratorTrait};
use scanner_admin::scanner::KeyType;
use scanner_admin::settings::{SettingsService, SettingsWriter, keys};
use sea_orm::Database;
use serde_json::json;

async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect test db");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

#[tokio::test]
async fn scanner_config_defaults_when_table_is_empty() {
    let service = SettingsService::new(setup_test_db().await);

    let config = service.scanner_config().await.expect("read config");
    assert_eq!(config.base_url, "");
    assert_eq!(config.api_key, "");
    assert_eq!(config.timeout, 15);
    assert_eq!(config.default_limit, 50);
}

#[tokio::test]
async fn schedule_config_defaults_when_table_is_empty() {
    let service = SettingsService::new(setup_test_db().await);

    let schedule = service.schedule_config().await.expect("read schedule");
    assert!(!schedule.sync_enabled);
    assert_eq!(schedule.sync_time, "03:00");
    assert_eq!(schedule.sync_limit, 100);
    assert_eq!(schedule.sync_type, KeyType::Valid);
    assert_eq!(schedule.reverify_time, "02:30");
    assert_eq!(schedule.reverify_count, 50);
    assert!(schedule.reverify_statuses.is_empty());
    assert_eq!(schedule.delete_time, "04:00");
    assert_eq!(schedule.delete_limit, 50);
}

#[tokio::test]
async fn update_many_inserts_and_reads_back() {
    let service = SettingsService::new(setup_test_db().await);

    service
        .update_many(vec![
            (
                keys::SCANNER_API_BASE_URL.to_string(),
                json!("https://scanner.example.com"),
            ),
            (keys::SCANNER_API_KEY.to_string(), json!("sk-test-1234")),
            (keys::SCANNER_API_TIMEOUT.to_string(), json!(30)),
            (keys::SCANNER_DEFAULT_LIMIT.to_string(), json!(200)),
        ])
        .await
        .expect("write config");

    let config = service.scanner_config().await.expect("read config");
    assert_eq!(config.base_url, "https://scanner.example.com");
    assert_eq!(config.api_key, "sk-test-1234");
    assert_eq!(config.timeout, 30);
    assert_eq!(config.default_limit, 200);
}

#[tokio::test]
async fn update_many_overwrites_existing_values() {
    let service = SettingsService::new(setup_test_db().await);

    service
        .update_many(vec![(keys::PAID_KEY.to_string(), json!("old-key"))])
        .await
        .expect("first write");
    service
        .update_many(vec![(keys::PAID_KEY.to_string(), json!("new-key"))])
        .await
        .expect("second write");

    let value = service
        .get_value(keys::PAID_KEY)
        .await
        .expect("read value");
    assert_eq!(value, Some(json!("new-key")));
}

#[tokio::test]
async fn update_many_with_empty_payload_is_a_no_op() {
    let service = SettingsService::new(setup_test_db().await);
    service.update_many(vec![]).await.expect("empty write");
    assert_eq!(service.get_value(keys::PAID_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn schedule_round_trips_through_store() {
    let service = SettingsService::new(setup_test_db().await);

    service
        .update_many(vec![
            (keys::SCANNER_SYNC_ENABLED.to_string(), json!(true)),
            (keys::SCANNER_SYNC_DAILY_TIME.to_string(), json!("05:30")),
            (keys::SCANNER_SYNC_LIMIT.to_string(), json!(300)),
            (keys::SCANNER_SYNC_TYPE.to_string(), json!("paid")),
            (
                keys::SCANNER_REVERIFY_STATUSES.to_string(),
                json!(["pending", "rate_limited"]),
            ),
        ])
        .await
        .expect("write schedule");

    let schedule = service.schedule_config().await.expect("read schedule");
    assert!(schedule.sync_enabled);
    assert_eq!(schedule.sync_time, "05:30");
    assert_eq!(schedule.sync_limit, 300);
    assert_eq!(schedule.sync_type, KeyType::Paid);
    assert_eq!(
        schedule.reverify_statuses,
        vec!["pending".to_string(), "rate_limited".to_string()]
    );
    // 未写入的键保持默认值
    assert!(!schedule.delete_enabled);
    assert_eq!(schedule.delete_time, "04:00");
}
