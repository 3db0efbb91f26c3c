//! 产品数据模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use validator::{Validate, ValidationError};

use crate::core::validation::{FieldKind, Payload};

/// 默认页码
pub const DEFAULT_PAGE: usize = 1;
/// 默认每页数量
pub const DEFAULT_LIMIT: usize = 5;

/// 产品记录
///
/// 已知字段有类型，其余字段原样保存在 `extra` 里并随记录一起返回。
/// `price` 保留请求里的数字原样，整数不会变成浮点数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Number,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// 用新 id 和创建请求组装一条记录，请求里的 `id` 被丢弃
    pub fn from_request(id: String, request: CreateProductRequest) -> Self {
        let CreateProductRequest {
            name,
            description,
            price,
            category,
            in_stock,
            mut extra,
        } = request;
        extra.remove("id");

        Self {
            id,
            name,
            description,
            price,
            category,
            in_stock,
            extra,
        }
    }

    /// 浅合并：请求里出现的字段覆盖原值，其余保持不变，`id` 不可修改
    pub fn apply(&mut self, update: UpdateProductRequest) {
        let UpdateProductRequest {
            name,
            description,
            price,
            category,
            in_stock,
            extra,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(in_stock) = in_stock {
            self.in_stock = Some(in_stock);
        }
        for (key, value) in extra {
            if key != "id" {
                self.extra.insert(key, value);
            }
        }
    }
}

/// 创建产品请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Number,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    pub in_stock: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 更新产品请求，所有字段可选
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Number>,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn validate_price(price: &Number) -> Result<(), ValidationError> {
    match price.as_f64() {
        Some(value) if value >= 0.0 => Ok(()),
        _ => {
            let mut error = ValidationError::new("non_negative");
            error.message = Some("price must be a non-negative number".into());
            Err(error)
        }
    }
}

const PRODUCT_FIELD_KINDS: &[(&str, FieldKind)] = &[
    ("name", FieldKind::String),
    ("description", FieldKind::String),
    ("price", FieldKind::Number),
    ("category", FieldKind::String),
    ("inStock", FieldKind::Boolean),
];

impl Payload for CreateProductRequest {
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "price", "category"];
    const FIELD_KINDS: &'static [(&'static str, FieldKind)] = PRODUCT_FIELD_KINDS;
}

impl Payload for UpdateProductRequest {
    const FIELD_KINDS: &'static [(&'static str, FieldKind)] = PRODUCT_FIELD_KINDS;
}

/// 列表查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// 分类，精确匹配
    pub category: Option<String>,
    /// 名称关键字，不区分大小写的子串匹配
    pub search: Option<String>,
    /// 页码，从 1 开始
    pub page: usize,
    /// 每页数量
    pub limit: usize,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub page: usize,
    pub total: usize,
    pub limit: usize,
    pub products: Vec<Product>,
}

/// `GET /api/products` 的原始查询参数
#[derive(Debug, Default)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListProductsQuery {
    /// 从查询串的键值对构造，同名参数只取第一个，未知参数忽略
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut query.category,
                "search" => &mut query.search,
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// 转换为查询条件。无法解析或不是正整数的 page/limit 使用默认值，limit 不超过 `max_limit`
    pub fn into_filter(self, default_limit: usize, max_limit: usize) -> ProductFilter {
        ProductFilter {
            category: self.category.filter(|c| !c.is_empty()),
            search: self.search.filter(|s| !s.is_empty()),
            page: parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(self.limit.as_deref())
                .unwrap_or(default_limit)
                .min(max_limit),
        }
    }
}

/// `GET /api/products/search` 的查询参数
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// 取开头的数字部分，允许一个前导 `+`，"2abc" 解析为 2；0、负数和非数字返回 `None`
fn parse_positive(raw: Option<&str>) -> Option<usize> {
    let trimmed = raw?.trim();
    let digits: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<usize>().ok().filter(|n| *n > 0)
}
