//! # 产品目录 API
//!
//! 基于 Axum 的内存产品目录服务，按分层组织：
//! - `app`：产品模型、内存存储、处理器与路由
//! - `core`：错误处理、中间件、请求体校验
//! - `infrastructure`：配置加载与日志初始化

pub mod app;
pub mod core;
pub mod infrastructure;

pub use crate::app::product::handler::AppState;
pub use crate::app::product::store::ProductStore;
pub use crate::app::router::create_router;
pub use crate::core::error::CoreError;
pub use crate::infrastructure::config::{load_config, Config};
