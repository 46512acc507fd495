//! # Scanner Admin 主程序
//!
//! scanner 集成管理服务 - 配置、调度并调用外部密钥扫描服务

use std::sync::Arc;

use tracing::info;

use scanner_admin::{
    AdminError, Result,
    app::AppContext,
    config::ConfigManager,
    database, logging,
    management::server::{ManagementConfig, ManagementServer},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    logging::init_optimized_logging(None);

    // 加载启动配置
    let config = ConfigManager::load()?;

    // 初始化数据库并执行迁移
    let db = database::init_database(&config.database.url)
        .await
        .map_err(|e| AdminError::database_with_source("数据库连接失败", e))?;
    database::run_migrations(&db)
        .await
        .map_err(|e| AdminError::database_with_source("数据库迁移失败", e))?;

    let management_config = ManagementConfig::from_app(&config);
    let context = Arc::new(AppContext::new(Arc::new(config), db));

    // 启动定时任务调度器
    let _scheduler_handle = context.scheduler.spawn();

    // 启动管理服务器
    info!("服务启动");
    ManagementServer::new(management_config, context)?.serve().await
}
