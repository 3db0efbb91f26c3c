//! 路由装配

use std::time::Duration;

use axum::{
    extract::State,
    http::Uri,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::product::handler::{
    create_product, delete_product, get_product, list_products, product_stats, search_products,
    update_product, AppState,
};
use crate::core::{
    error::CoreError,
    middleware::{request_logging_middleware, require_api_key},
};

pub const WELCOME_MESSAGE: &str =
    "Welcome to the Product API! Go to /api/products to see all products.";

/// 创建应用路由
///
/// `search` 和 `stats` 是静态路径段，匹配优先级高于 `:id`。
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/search", get(search_products))
        .route("/api/products/stats", get(product_stats))
        .route("/api/products/:id", get(get_product));

    let protected = Router::new()
        .route("/api/products", post(create_product))
        .route("/api/products/:id", put(update_product).delete(delete_product))
        .route_layer(middleware::from_fn_with_state(
            state.config.auth.clone(),
            require_api_key,
        ));

    let timeout = Duration::from_secs(state.config.http.timeout_seconds);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .merge(public)
        .merge(protected)
        .fallback(not_found)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "products": state.products.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found(uri: Uri) -> CoreError {
    CoreError::NotFound(format!("Route {} not found", uri.path()))
}
