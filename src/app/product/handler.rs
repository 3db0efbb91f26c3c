//! 产品接口处理器

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use super::{
    model::{
        CreateProductRequest, ListProductsQuery, Product, ProductPage, SearchQuery,
        UpdateProductRequest,
    },
    store::ProductStore,
};
use crate::core::{
    error::CoreError,
    validation::{ValidatedJson, ValidatedQuery},
};
use crate::infrastructure::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(products: ProductStore, config: Config) -> Self {
        Self {
            products: Arc::new(products),
            config: Arc::new(config),
        }
    }

    /// 按配置决定是否载入示例数据
    pub fn from_config(config: Config) -> Self {
        let products = if config.catalog.seed_products {
            ProductStore::seeded()
        } else {
            ProductStore::new()
        };
        Self::new(products, config)
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(pairs): ValidatedQuery<Vec<(String, String)>>,
) -> Json<ProductPage> {
    let catalog = &state.config.catalog;
    // 同名参数只取第一个，列表接口不因查询串失败
    let filter = ListProductsQuery::from_pairs(pairs)
        .into_filter(catalog.default_page_size, catalog.max_page_size);
    Json(state.products.list(&filter))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CoreError> {
    let product = state.products.get_by_id(&id)?;
    Ok(Json(product))
}

pub async fn search_products(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Result<Json<Vec<Product>>, CoreError> {
    let name = query.name.ok_or_else(|| {
        CoreError::BadRequest("Query parameter `name` is required".to_string())
    })?;
    Ok(Json(state.products.search_by_name(&name)))
}

pub async fn product_stats(State(state): State<AppState>) -> Json<BTreeMap<String, usize>> {
    Json(state.products.stats_by_category())
}

pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> (StatusCode, Json<Product>) {
    let product = state.products.create(payload);
    info!("Created product: {} ({})", product.name, product.id);
    (StatusCode::CREATED, Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<Product>, CoreError> {
    let product = state.products.update(&id, payload)?;
    info!("Updated product: {} ({})", product.name, product.id);
    Ok(Json(product))
}

/// 删除成功时返回被删除的记录
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CoreError> {
    let product = state.products.delete(&id)?;
    info!("Deleted product: {} ({})", product.name, product.id);
    Ok(Json(product))
}
