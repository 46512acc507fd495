//! # 路由配置
//!
//! 定义所有API路由和路由组织

use crate::management::server::AppState;
use axum::Router;
use axum::routing::{get, post, put};

/// 创建所有路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // scanner 集成管理路由
        .nest("/scanner", scanner_routes(state.clone()))
        .with_state(state)
}

/// scanner 集成管理路由
///
/// 所有接口都在会话认证中间件之后
fn scanner_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/config",
            get(crate::management::handlers::scanner::get_scanner_config),
        )
        .route(
            "/config",
            put(crate::management::handlers::scanner::update_scanner_config),
        )
        .route(
            "/ping",
            get(crate::management::handlers::scanner::ping_scanner),
        )
        .route(
            "/schedule",
            get(crate::management::handlers::scanner::get_schedule_config),
        )
        .route(
            "/schedule",
            put(crate::management::handlers::scanner::update_schedule_config),
        )
        .route(
            "/key-assets",
            get(crate::management::handlers::scanner::fetch_key_assets),
        )
        .route(
            "/reverify",
            post(crate::management::handlers::scanner::trigger_reverify),
        )
        .route(
            "/sync-now",
            post(crate::management::handlers::scanner::sync_now),
        )
        .route(
            "/delete-invalid",
            post(crate::management::handlers::scanner::delete_invalid),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            crate::management::middleware::session_auth,
        ))
}
