//! 产品内存存储
//!
//! 记录按插入顺序保存在一个 `Vec` 里，由一把读写锁保护：读操作可以并发，
//! 创建/更新/删除互斥执行。锁内不做任何 await。

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde_json::{Map, Number};
use uuid::Uuid;

use super::model::{
    CreateProductRequest, Product, ProductFilter, ProductPage, UpdateProductRequest,
};
use crate::core::error::CoreError;

#[derive(Debug, Default)]
pub struct ProductStore {
    products: RwLock<Vec<Product>>,
}

impl ProductStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 用已有记录初始化，调用方保证 id 互不相同
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// 带三条示例产品的存储
    pub fn seeded() -> Self {
        Self::with_products(seed_products())
    }

    pub fn len(&self) -> usize {
        self.products.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }

    /// 按分类、名称过滤后分页；页码越界返回空列表
    pub fn list(&self, filter: &ProductFilter) -> ProductPage {
        let products = self.products.read();
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let matches: Vec<&Product> = products
            .iter()
            .filter(|p| filter.category.as_deref().map_or(true, |c| p.category == c))
            .filter(|p| needle.as_deref().map_or(true, |n| name_contains(p, n)))
            .collect();

        let total = matches.len();
        let start = filter.page.saturating_sub(1).saturating_mul(filter.limit);
        let page = matches
            .into_iter()
            .skip(start)
            .take(filter.limit)
            .cloned()
            .collect();

        ProductPage {
            page: filter.page,
            total,
            limit: filter.limit,
            products: page,
        }
    }

    pub fn get_by_id(&self, id: &str) -> Result<Product, CoreError> {
        self.products
            .read()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// 分配新 id 并追加到末尾
    pub fn create(&self, request: CreateProductRequest) -> Product {
        let mut products = self.products.write();

        let mut id = Uuid::new_v4().to_string();
        while products.iter().any(|p| p.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let product = Product::from_request(id, request);
        products.push(product.clone());
        product
    }

    /// 原位浅合并，位置和 id 不变
    pub fn update(&self, id: &str, request: UpdateProductRequest) -> Result<Product, CoreError> {
        let mut products = self.products.write();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;

        product.apply(request);
        Ok(product.clone())
    }

    /// 删除一条记录并返回它
    pub fn delete(&self, id: &str) -> Result<Product, CoreError> {
        let mut products = self.products.write();
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;

        Ok(products.remove(index))
    }

    /// 不分页的名称搜索，空关键字匹配全部
    pub fn search_by_name(&self, term: &str) -> Vec<Product> {
        let needle = term.to_lowercase();
        self.products
            .read()
            .iter()
            .filter(|p| name_contains(p, &needle))
            .cloned()
            .collect()
    }

    /// 每个分类的记录数
    pub fn stats_by_category(&self) -> BTreeMap<String, usize> {
        let mut stats = BTreeMap::new();
        for product in self.products.read().iter() {
            *stats.entry(product.category.clone()).or_insert(0) += 1;
        }
        stats
    }
}

fn name_contains(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound(format!("Product {} not found", id))
}

/// 示例数据
pub fn seed_products() -> Vec<Product> {
    let sample = |id: &str, name: &str, description: &str, price: u64, category: &str| Product {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        price: Number::from(price),
        category: category.to_string(),
        in_stock: Some(true),
        extra: Map::new(),
    };

    vec![
        sample("1", "Laptop", "High-performance laptop with 16GB RAM", 1200, "electronics"),
        sample("2", "Smartphone", "Latest model with 128GB storage", 800, "electronics"),
        sample("3", "Coffee Maker", "Programmable coffee maker with timer", 50, "kitchen"),
    ]
}
