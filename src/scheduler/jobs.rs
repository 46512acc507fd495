//! # Scanner 定时任务调度器
//!
//! 单个后台循环：读取日程配置，睡到最近的触发时刻，执行对应动作。
//! 日程更新后由路由层调用 `reload` 唤醒循环重新计算

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::scanner::{ScannerClient, sync_keys_from_scanner};
use crate::settings::{ScheduleConfig, SettingsService};

/// 配置读取失败后的重试间隔
const RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// 定时任务类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Sync,
    Reverify,
    DeleteInvalid,
}

/// Scanner 定时任务调度器
pub struct ScannerJobScheduler {
    settings: Arc<SettingsService>,
    reload: Notify,
}

impl ScannerJobScheduler {
    /// 创建调度器
    #[must_use]
    pub fn new(settings: Arc<SettingsService>) -> Self {
        Self {
            settings,
            reload: Notify::new(),
        }
    }

    /// 通知调度循环重新读取日程配置
    pub fn reload(&self) {
        info!("定时任务配置已变更，通知调度器重载");
        self.reload.notify_one();
    }

    /// 启动后台调度循环
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await })
    }

    async fn run(&self) {
        loop {
            let schedule = match self.settings.schedule_config().await {
                Ok(schedule) => schedule,
                Err(err) => {
                    error!("读取定时任务配置失败: {err}");
                    tokio::select! {
                        () = tokio::time::sleep(RETRY_INTERVAL) => {}
                        () = self.reload.notified() => {}
                    }
                    continue;
                }
            };

            let now = Local::now().naive_local();
            let Some((job, at)) = next_job(&schedule, now) else {
                info!("未启用任何 scanner 定时任务，等待配置变更");
                self.reload.notified().await;
                continue;
            };

            let wait = (at - now).to_std().unwrap_or_default();
            info!("下一个定时任务 {job:?} 将于 {at} 执行");

            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    if let Err(err) = self.execute(job, &schedule).await {
                        error!("定时任务 {job:?} 执行失败: {err}");
                    }
                }
                () = self.reload.notified() => {
                    info!("重新加载定时任务配置");
                }
            }
        }
    }

    async fn execute(&self, job: JobKind, schedule: &ScheduleConfig) -> Result<()> {
        let client = ScannerClient::from_config(&self.settings.scanner_config().await?);

        match job {
            JobKind::Sync => {
                let summary = sync_keys_from_scanner(
                    &client,
                    self.settings.as_ref(),
                    schedule.sync_limit,
                    schedule.sync_type,
                )
                .await?;
                info!(
                    "定时同步完成: synced={}, applied={}",
                    summary.synced, summary.applied
                );
            }
            JobKind::Reverify => {
                let statuses = if schedule.reverify_statuses.is_empty() {
                    None
                } else {
                    Some(schedule.reverify_statuses.as_slice())
                };
                client
                    .trigger_reverify(schedule.reverify_count, statuses)
                    .await?;
                info!("定时复验已触发: count={}", schedule.reverify_count);
            }
            JobKind::DeleteInvalid => {
                client.delete_invalid(schedule.delete_limit).await?;
                info!("定时清理已触发: limit={}", schedule.delete_limit);
            }
        }
        Ok(())
    }
}

/// 解析 HH:MM 格式的每日时刻
fn parse_daily_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// 计算某个每日时刻距 `now` 最近的下一次出现
fn next_occurrence(time_str: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let time = parse_daily_time(time_str)?;
    let today = now.date().and_time(time);
    if today > now {
        Some(today)
    } else {
        Some(now.date().succ_opt()?.and_time(time))
    }
}

/// 在启用的任务里挑出最先触发的那一个
fn next_job(schedule: &ScheduleConfig, now: NaiveDateTime) -> Option<(JobKind, NaiveDateTime)> {
    let mut candidates = Vec::new();

    let mut push = |kind: JobKind, enabled: bool, time_str: &str| {
        if !enabled {
            return;
        }
        if let Some(at) = next_occurrence(time_str, now) {
            candidates.push((kind, at));
        } else {
            warn!("无法解析定时任务 {kind:?} 的时间 {time_str:?}，该任务将被跳过");
        }
    };

    push(JobKind::Reverify, schedule.reverify_enabled, &schedule.reverify_time);
    push(JobKind::Sync, schedule.sync_enabled, &schedule.sync_time);
    push(JobKind::DeleteInvalid, schedule.delete_enabled, &schedule.delete_time);

    candidates.into_iter().min_by_key(|(_, at)| *at)
}
