//! # 定时任务模块
//!
//! 按日程配置在每天固定时刻触发同步/复验/清理

mod jobs;

pub use jobs::ScannerJobScheduler;
