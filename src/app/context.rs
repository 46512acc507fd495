//! # 应用上下文
//!
//! 持有各服务的共享句柄，请求处理器通过它访问协作方。
//! 没有进程级可变单例：运行时配置总是经由设置服务按需读取

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::scheduler::ScannerJobScheduler;
use crate::settings::SettingsService;

/// 应用上下文
pub struct AppContext {
    /// 启动配置
    pub config: Arc<AppConfig>,
    /// 数据库连接
    pub db: DatabaseConnection,
    /// 运行时设置存取服务
    pub settings: Arc<SettingsService>,
    /// 会话令牌验证服务
    pub auth: Arc<AuthService>,
    /// scanner 定时任务调度器
    pub scheduler: Arc<ScannerJobScheduler>,
}

impl AppContext {
    /// 组装应用上下文
    #[must_use]
    pub fn new(config: Arc<AppConfig>, db: DatabaseConnection) -> Self {
        let settings = Arc::new(SettingsService::new(db.clone()));
        let auth = Arc::new(AuthService::new(&config.auth));
        let scheduler = Arc::new(ScannerJobScheduler::new(Arc::clone(&settings)));

        Self {
            config,
            db,
            settings,
            auth,
            scheduler,
        }
    }
}
