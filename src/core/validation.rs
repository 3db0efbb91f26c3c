//! 请求体校验
//!
//! `ValidatedJson<T>` 依次检查：请求体是合法的 JSON 对象、必填字段齐全、
//! 已出现字段的 JSON 类型正确、`validator` 规则通过。任何一步失败都返回
//! `CoreError::BadRequest`，消息里列出所有有问题的字段。
//! `ValidatedQuery<T>` 把查询串解析失败同样转成 `CoreError::BadRequest`。

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use super::error::CoreError;

/// JSON 字段的期望类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
}

impl FieldKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
        }
    }
}

/// 可以经过 `ValidatedJson` 提取的请求体
pub trait Payload: DeserializeOwned + Validate {
    /// 必须出现且不为 null 的字段
    const REQUIRED_FIELDS: &'static [&'static str] = &[];

    /// 出现时需要检查类型的字段
    const FIELD_KINDS: &'static [(&'static str, FieldKind)] = &[];
}

/// 带校验的 JSON 提取器
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: Payload + Send,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| CoreError::BadRequest(rejection.body_text()))?;

        parse_payload(value).map(ValidatedJson)
    }
}

/// 查询串提取器，解析失败时返回统一的 JSON 错误
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| CoreError::BadRequest(rejection.body_text()))?;

        Ok(ValidatedQuery(value))
    }
}

/// 把一个 JSON 值校验并转换成请求体类型
pub fn parse_payload<T: Payload>(value: Value) -> Result<T, CoreError> {
    let Value::Object(map) = value else {
        return Err(CoreError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let missing: Vec<&str> = T::REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| map.get(*field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let invalid: Vec<String> = T::FIELD_KINDS
        .iter()
        .filter_map(|(field, kind)| match map.get(*field) {
            Some(value) if !value.is_null() && !kind.matches(value) => {
                Some(format!("{} (expected {})", field, kind.as_str()))
            }
            _ => None,
        })
        .collect();
    if !invalid.is_empty() {
        return Err(CoreError::BadRequest(format!(
            "Invalid fields: {}",
            invalid.join(", ")
        )));
    }

    let payload: T = serde_json::from_value(Value::Object(map))
        .map_err(|e| CoreError::BadRequest(format!("Invalid request body: {}", e)))?;
    payload.validate()?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "label must not be empty"))]
        label: String,
        #[validate(range(min = 0, message = "count must be non-negative"))]
        count: i64,
        flag: Option<bool>,
    }

    impl Payload for Sample {
        const REQUIRED_FIELDS: &'static [&'static str] = &["label", "count"];
        const FIELD_KINDS: &'static [(&'static str, FieldKind)] = &[
            ("label", FieldKind::String),
            ("count", FieldKind::Number),
            ("flag", FieldKind::Boolean),
        ];
    }

    fn message(err: CoreError) -> String {
        match err {
            CoreError::BadRequest(msg) => msg,
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_body() {
        let err = parse_payload::<Sample>(json!([1, 2])).unwrap_err();
        assert!(message(err).contains("JSON object"));
    }

    #[test]
    fn test_lists_every_missing_field() {
        let err = parse_payload::<Sample>(json!({ "flag": true })).unwrap_err();
        assert_eq!(message(err), "Missing required fields: label, count");
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = parse_payload::<Sample>(json!({ "label": null, "count": 1 })).unwrap_err();
        assert_eq!(message(err), "Missing required fields: label");
    }

    #[test]
    fn test_reports_wrong_types() {
        let err =
            parse_payload::<Sample>(json!({ "label": 5, "count": "x", "flag": "yes" }))
                .unwrap_err();
        assert_eq!(
            message(err),
            "Invalid fields: label (expected string), count (expected number), flag (expected boolean)"
        );
    }

    #[test]
    fn test_runs_validator_rules() {
        let err = parse_payload::<Sample>(json!({ "label": "", "count": -1 })).unwrap_err();
        assert_eq!(
            message(err),
            "count must be non-negative, label must not be empty"
        );
    }

    #[test]
    fn test_accepts_valid_payload() {
        let sample = parse_payload::<Sample>(json!({ "label": "a", "count": 3 })).unwrap();
        assert_eq!(sample.label, "a");
        assert_eq!(sample.count, 3);
        assert_eq!(sample.flag, None);
    }
}
