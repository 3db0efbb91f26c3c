//! 核心中间件模块

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

use super::error::CoreError;
use crate::infrastructure::config::AuthConfig;

/// 请求日志中间件
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    info!(
        "{} {} - {} - {}ms - User-Agent: {:?}",
        method,
        uri,
        status,
        duration.as_millis(),
        user_agent
    );

    response
}

/// 认证中间件，只挂在修改数据的路由上
///
/// 接受 `x-api-key: <key>` 或 `Authorization: Bearer <key>`。
/// 没有提供密钥返回 401，密钥不匹配返回 403。
pub async fn require_api_key(
    State(auth): State<AuthConfig>,
    req: Request,
    next: Next,
) -> Result<Response, CoreError> {
    let verdict = match extract_api_key(req.headers()) {
        None => Err(CoreError::Unauthorized),
        Some(key) if key != auth.api_key => Err(CoreError::Forbidden),
        Some(_) => Ok(()),
    };

    if let Err(err) = verdict {
        warn!("Rejected {} {}: {}", req.method(), req.uri(), err);
        return Err(err);
    }

    Ok(next.run(req).await)
}

fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    let from_header = headers
        .get("x-api-key")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty());

    from_header.or_else(|| {
        headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    fn protected_app() -> Router {
        let auth = AuthConfig {
            api_key: "test-key".to_string(),
        };
        Router::new()
            .route("/write", post(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(auth, require_api_key))
    }

    fn request(header: Option<(&str, &str)>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method("POST").uri("/write");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_api_key_prefers_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "a".parse().unwrap());
        headers.insert("authorization", "Bearer b".parse().unwrap());
        assert_eq!(extract_api_key(&headers), Some("a"));

        headers.remove("x-api-key");
        assert_eq!(extract_api_key(&headers), Some("b"));

        headers.insert("authorization", "Basic b".parse().unwrap());
        assert_eq!(extract_api_key(&headers), None);
    }

    #[tokio::test]
    async fn test_missing_key_is_unauthorized() {
        let response = protected_app().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_key_is_forbidden() {
        let response = protected_app()
            .oneshot(request(Some(("x-api-key", "nope"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_valid_key_passes() {
        let response = protected_app()
            .oneshot(request(Some(("authorization", "Bearer test-key"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
