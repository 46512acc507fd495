//! # 管理服务器
//!
//! Axum HTTP服务器，提供 scanner 集成的管理API

use crate::app::AppContext;
use crate::config::AppConfig;
use crate::error::{AdminError, Result};
use axum::Router;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 管理服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementConfig {
    /// 监听地址
    pub bind_address: String,
    /// 监听端口
    pub port: u16,
    /// 是否启用CORS
    pub enable_cors: bool,
    /// 允许的CORS源地址
    pub cors_origins: Vec<String>,
    /// API前缀
    pub api_prefix: String,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            api_prefix: "/api".to_string(),
        }
    }
}

impl ManagementConfig {
    /// 从应用配置构建
    #[must_use]
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            bind_address: config.server.host.clone(),
            port: config.server.port,
            enable_cors: config.server.enable_cors,
            cors_origins: config.server.cors_origins.clone(),
            ..Self::default()
        }
    }
}

/// 管理服务器应用状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// 管理服务器
pub struct ManagementServer {
    /// 配置
    config: ManagementConfig,
    /// 路由器
    router: Router,
}

impl ManagementServer {
    /// 创建新的管理服务器
    pub fn new(config: ManagementConfig, context: Arc<AppContext>) -> Result<Self> {
        let state = AppState::new(context);
        let router = Self::create_router(state, &config);
        Ok(Self { config, router })
    }

    /// 创建路由器
    fn create_router(state: AppState, config: &ManagementConfig) -> Router {
        let api_routes = super::routes::create_routes(state);

        let mut app = Router::new()
            // 将所有API路由嵌套在 /api 下
            .nest(&config.api_prefix, api_routes)
            .route("/", get(crate::management::handlers::system::root_handler))
            .route(
                "/ping",
                get(crate::management::handlers::system::ping_handler),
            );

        let service_builder = ServiceBuilder::new().layer(TraceLayer::new_for_http());

        // 配置CORS
        if config.enable_cors {
            let mut cors_layer = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    axum::http::header::ORIGIN,
                ]);

            if config.cors_origins.contains(&"*".to_string()) {
                cors_layer = cors_layer.allow_origin(Any);
            } else {
                let origins = config
                    .cors_origins
                    .iter()
                    .map(|origin| origin.parse::<axum::http::HeaderValue>())
                    .collect::<std::result::Result<Vec<_>, axum::http::header::InvalidHeaderValue>>(
                    );

                match origins {
                    Ok(origins) => {
                        cors_layer = cors_layer.allow_origin(origins);
                    }
                    Err(e) => {
                        warn!("CORS 源配置无效: {e}, 回退为允许所有源");
                        cors_layer = cors_layer.allow_origin(Any);
                    }
                }
            }

            app = app.layer(service_builder.layer(cors_layer));
        } else {
            app = app.layer(service_builder);
        }

        app
    }

    /// 启动服务器
    pub async fn serve(self) -> Result<()> {
        let bind_address = self.config.bind_address.clone();
        let ip = bind_address.parse::<std::net::IpAddr>().map_err(|e| {
            AdminError::config(format!("无效的管理服务监听地址 '{bind_address}': {e}"))
        })?;
        let addr = SocketAddr::new(ip, self.config.port);

        info!("管理服务器监听于 {addr}");

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }

    /// 获取路由器副本（主要用于测试）
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
