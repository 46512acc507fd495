//! # Scanner API 客户端
//!
//! 封装对 scanner 暴露的 Gemini Key 接口的调用，并把传输层/状态码错误
//! 归一成少量应用错误类别

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde_json::{Value as JsonValue, json};
use tracing::error;

use super::types::{KeyType, PingErrorType, PingResult};
use crate::error::{AdminError, Context, NetworkError, Result, ScannerError};
use crate::settings::ScannerConfig;

/// Scanner API 客户端
///
/// 每个请求按当前设置新建实例，不做任何缓存
#[derive(Debug, Clone)]
pub struct ScannerClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl ScannerClient {
    /// 创建客户端，`base_url` 末尾的斜杠会被去掉
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> Self {
        let http_client = match Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                error!("构建 scanner HTTP 客户端失败，将回退到默认客户端: {err}");
                Client::new()
            }
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client,
        }
    }

    /// 按 scanner 接入配置创建客户端
    #[must_use]
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(&config.base_url, &config.api_key, config.timeout)
    }

    /// 获取密钥资产列表
    ///
    /// 返回上游 JSON 原文，供路由层透传
    pub async fn fetch_key_assets(&self, limit: u32, key_type: KeyType) -> Result<JsonValue> {
        let bearer = self.bearer()?;
        let url = format!("{}/api/gemini/key-assets", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("type", key_type.as_str())])
            .query(&[("limit", limit)])
            .header(header::AUTHORIZATION, bearer)
            .send()
            .await
            .map_err(|err| unreachable_error("key-assets", &err))?;

        into_json("key-assets", response).await
    }

    /// 触发一批密钥的复验
    pub async fn trigger_reverify(
        &self,
        count: u32,
        statuses: Option<&[String]>,
    ) -> Result<JsonValue> {
        let bearer = self.bearer()?;
        let url = format!("{}/api/gemini/reverify", self.base_url);

        let mut payload = serde_json::Map::new();
        payload.insert("count".to_string(), json!(count));
        if let Some(statuses) = statuses {
            if !statuses.is_empty() {
                payload.insert("filter_by_status".to_string(), json!(statuses.join(",")));
            }
        }

        let response = self
            .http_client
            .post(&url)
            .header(header::AUTHORIZATION, bearer)
            .json(&JsonValue::Object(payload))
            .send()
            .await
            .map_err(|err| unreachable_error("reverify", &err))?;

        into_json("reverify", response).await
    }

    /// 删除无效密钥
    pub async fn delete_invalid(&self, limit: u32) -> Result<JsonValue> {
        let bearer = self.bearer()?;
        let url = format!("{}/api/gemini/delete-invalid", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header(header::AUTHORIZATION, bearer)
            .json(&json!({ "count": limit }))
            .send()
            .await
            .map_err(|err| unreachable_error("delete-invalid", &err))?;

        into_json("delete-invalid", response).await
    }

    /// 测试 scanner 健康，区分连通性与授权错误
    ///
    /// 第一阶段为匿名健康检查，失败时不再发起授权调用；只有在
    /// API Key 完全未配置时才返回错误，其余情况都体现在 `PingResult` 里
    pub async fn ping(&self) -> Result<PingResult> {
        let mut result = PingResult::default();

        match self
            .http_client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await
        {
            Ok(response) => {
                result.connectivity = response.status() == StatusCode::OK;
            }
            Err(err) => {
                error!("scanner 健康检查失败: {err}");
                result.message = Some("无法连接 scanner 服务".to_string());
                result.error_type = Some(PingErrorType::Connectivity);
                return Ok(result);
            }
        }

        if !result.connectivity {
            result.message = Some("scanner 启动或响应异常".to_string());
            result.error_type = Some(PingErrorType::Connectivity);
            return Ok(result);
        }

        let bearer = self.bearer()?;
        let request = self
            .http_client
            .get(format!("{}/api/gemini/key-assets", self.base_url))
            .query(&[("type", KeyType::Valid.as_str()), ("limit", "1")])
            .header(header::AUTHORIZATION, bearer);

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    result.message = Some("scanner API Key 无效".to_string());
                    result.error_type = Some(PingErrorType::Auth);
                    return Ok(result);
                }
                if !status.is_success() {
                    let detail = detail_from(status, response.text().await.unwrap_or_default());
                    error!("scanner 授权测试失败: {detail}");
                    result.message = Some(detail);
                    result.error_type = Some(PingErrorType::ScannerError);
                    return Ok(result);
                }
                result.auth = true;
                Ok(result)
            }
            Err(err) => {
                error!("scanner 授权请求失败: {err}");
                result.message = Some("无法连接 scanner 服务".to_string());
                result.error_type = Some(PingErrorType::Connectivity);
                Ok(result)
            }
        }
    }

    /// 构造 Bearer 头，未配置 API Key 时直接失败
    fn bearer(&self) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ScannerError::MissingApiKey.into());
        }
        Ok(format!("Bearer {}", self.api_key))
    }

    #[cfg(test)]
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// 把上游响应转换为 JSON，非 2xx 状态映射为 `ScannerError::ApiError`
async fn into_json(operation: &str, response: reqwest::Response) -> Result<JsonValue> {
    let status = response.status();

    if !status.is_success() {
        let detail = detail_from(status, response.text().await.unwrap_or_default());
        error!("调用 scanner {operation} 失败: {status} - {detail}");
        return Err(ScannerError::ApiError {
            status: status.as_u16(),
            detail,
        }
        .into());
    }

    let body = response
        .text()
        .await
        .map_err(|err| unreachable_error(operation, &err))?;
    if body.is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_json::from_str(&body).context("解析 scanner 响应失败")
}

/// 错误详情：优先使用响应体，缺失时回退到状态短语
fn detail_from(status: StatusCode, body: String) -> String {
    if body.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body
    }
}

/// 传输层错误统一归为不可达，不区分 DNS/连接/超时
fn unreachable_error(operation: &str, err: &reqwest::Error) -> AdminError {
    error!("无法连接 scanner ({operation}): {err}");
    NetworkError::UpstreamUnreachable("无法连接 scanner API".to_string()).into()
}
