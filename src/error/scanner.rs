use thiserror::Error;

/// scanner 上游交互错误
///
/// 错误被刻意压缩为少量桶位，路由层只需据此映射固定的 HTTP 状态码
#[derive(Debug, Error)]
pub enum ScannerError {
    /// API Key 未配置，在发起任何网络调用前检查
    #[error("Scanner API Key 未配置")]
    MissingApiKey,

    /// 上游返回非 2xx 状态，状态码与响应体原样向外传递
    #[error("Scanner API error: {status} - {detail}")]
    ApiError { status: u16, detail: String },
}
