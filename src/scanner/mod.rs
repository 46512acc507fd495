//! # Scanner 集成模块
//!
//! 封装对外部 scanner 服务的调用，以及把发现的密钥同步进本地设置的逻辑

mod client;
mod sync;
mod types;

pub use client::ScannerClient;
pub use sync::{apply_synced_keys, sync_keys_from_scanner};
pub use types::{KeyAsset, KeyType, PingErrorType, PingResult, SyncSummary};
