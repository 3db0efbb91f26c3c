//! 核心层：错误处理、中间件、请求校验

pub mod error;
pub mod middleware;
pub mod validation;
