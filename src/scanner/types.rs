//! # Scanner 数据结构定义

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 密钥类型
///
/// 同时用于 key-assets 查询参数与定时同步配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// 普通有效密钥
    #[default]
    Valid,
    /// 付费密钥
    Paid,
}

impl KeyType {
    /// 对应的查询参数值
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// scanner 返回的单条密钥记录
///
/// 除 `key` 与 `recheck_status` 外的字段原样保留，用于透传响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyAsset {
    /// 密钥内容
    #[serde(default)]
    pub key: String,
    /// 复验状态
    #[serde(default)]
    pub recheck_status: String,
    /// 其余字段
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// ping 的失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PingErrorType {
    /// 无法连接或健康检查失败
    Connectivity,
    /// API Key 被上游拒绝
    Auth,
    /// 上游返回其它错误
    ScannerError,
}

/// ping 的三态结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResult {
    /// 基础连通性
    pub connectivity: bool,
    /// 授权调用是否通过
    pub auth: bool,
    /// 诊断信息
    pub message: Option<String>,
    /// 失败类别
    pub error_type: Option<PingErrorType>,
}

/// 一次密钥同步的结果摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// 提取到的密钥数量
    pub synced: usize,
    /// 是否写入了本地设置
    pub applied: bool,
    /// 被更新的设置字段
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_fields: Option<Vec<String>>,
    /// 未写入时的原因说明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 上游报告的总数，缺失时回退为条目数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// 本次同步的密钥类型
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<KeyType>,
}
