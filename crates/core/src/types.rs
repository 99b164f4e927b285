use crate::enums::Role;
use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// 默认模型 (小尺寸本地模型)
pub const DEFAULT_MODEL: &str = "gemma3:4b";

/// 1. 入站请求：POST /api/chat 的请求体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// 发送给模型的消息内容，缺省时使用默认问题
    #[schema(example = "Explain quantum computing")]
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    /// 从原始请求体解析
    ///
    /// 只有 body 不是合法 JSON 时才返回 `InvalidPayload`。
    /// 空 body、数组、标量都等价于 `{}`；content 的取值按 `content_to_prompt` 处理。
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;

        let content = match value {
            Value::Object(mut fields) => fields.remove("content"),
            _ => None,
        };

        Ok(Self {
            content: content.and_then(content_to_prompt),
        })
    }
}

/// content 字段转成文本
///
/// null / false / 0 / "" 视为没有内容 (之后替换成默认问题)；
/// 字符串原样保留；其他值 (true、非零数字、数组、对象) 用其 JSON 文本。
fn content_to_prompt(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// 2. 成功响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// 模型返回的原文
    pub result: String,
}

/// 3. 失败响应 (固定文案，不暴露后端细节)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// 错误信息
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// 4. 发给后端 / 后端返回的单条消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 5. 模型标识
/// 部署时确定，进程生命周期内不可变
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSelector(String);

impl ModelSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self(DEFAULT_MODEL.to_string())
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelSelector {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModelSelector {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_field() {
        let req = ChatRequest::from_body(br#"{"content":"Explain quantum computing"}"#).unwrap();
        assert_eq!(req.content.as_deref(), Some("Explain quantum computing"));
    }

    #[test]
    fn empty_body_and_null_are_absent() {
        assert_eq!(ChatRequest::from_body(b"").unwrap().content, None);
        assert_eq!(ChatRequest::from_body(b"  \n").unwrap().content, None);
        assert_eq!(ChatRequest::from_body(b"{}").unwrap().content, None);
        assert_eq!(
            ChatRequest::from_body(br#"{"content":null}"#).unwrap().content,
            None
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let req = ChatRequest::from_body(br#"{"content":"hi","model":"llama3"}"#).unwrap();
        assert_eq!(req.content.as_deref(), Some("hi"));
    }

    #[test]
    fn only_invalid_json_is_rejected() {
        for body in [&b"{not json"[..], &b"{\"content\":"[..], &b"hello"[..]] {
            let err = ChatRequest::from_body(body).unwrap_err();
            assert!(
                matches!(err, RelayError::InvalidPayload(_)),
                "unexpected error for {:?}: {:?}",
                String::from_utf8_lossy(body),
                err
            );
        }
    }

    #[test]
    fn non_object_json_counts_as_empty_request() {
        for body in [&b"[]"[..], &b"[1,2,3]"[..], &b"\"hello\""[..], &b"42"[..], &b"null"[..]] {
            assert_eq!(ChatRequest::from_body(body).unwrap(), ChatRequest::default());
        }
    }

    #[test]
    fn falsy_content_counts_as_absent() {
        for body in [
            &br#"{"content":false}"#[..],
            &br#"{"content":0}"#[..],
            &br#"{"content":0.0}"#[..],
            &br#"{"content":""}"#[..],
        ] {
            assert_eq!(ChatRequest::from_body(body).unwrap().content, None);
        }
    }

    #[test]
    fn truthy_non_string_content_is_stringified() {
        let req = ChatRequest::from_body(br#"{"content":42}"#).unwrap();
        assert_eq!(req.content.as_deref(), Some("42"));
        let req = ChatRequest::from_body(br#"{"content":true}"#).unwrap();
        assert_eq!(req.content.as_deref(), Some("true"));
    }

    #[test]
    fn user_message_wire_shape() {
        let msg = serde_json::to_value(ChatMessage::user("hello")).unwrap();
        assert_eq!(msg, serde_json::json!({ "role": "user", "content": "hello" }));
    }

    #[test]
    fn model_selector_defaults_to_small_model() {
        assert_eq!(ModelSelector::default().as_str(), "gemma3:4b");
        assert_eq!(ModelSelector::from("llama3.2:1b").to_string(), "llama3.2:1b");
    }
}
