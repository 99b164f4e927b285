use super::ModelBackend;
use async_trait::async_trait;
use relay_core::{ChatMessage, ModelSelector, RelayError};
use reqwest::header;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

// ==========================================
// 1. 定义响应结构体 (Ollama /api/chat, stream=false)
// ==========================================

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    // 对应 JSON 中的 "message"
    message: Option<OllamaMessage>,
    // 对应 JSON 中的 "done" (可选，用于调试)
    #[serde(default)]
    done: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    // 对应 JSON 中的 "content"
    content: Option<String>,
}

// ==========================================
// 2. 实现 Ollama Backend
// ==========================================

pub struct OllamaBackend {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    /// 创建一个新的 Ollama 实例
    ///
    /// * `base_url` - Ollama 根地址，例如 `http://127.0.0.1:11434`
    /// * `timeout` - 客户端超时；`None` 表示一直等到后端返回
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build reqwest client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(
        &self,
        model: &ModelSelector,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage, RelayError> {
        // 1. 构建请求 Body (一次性返回，不走流式)
        let request_body = json!({
            "model": model,
            "messages": messages,
            "stream": false
        });

        // 2. 发送异步请求
        tracing::debug!("Sending request to Ollama model: {}", model);
        let res = self
            .client
            .post(self.chat_url())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                RelayError::BackendUnavailable(format!("Failed to send request to Ollama: {}", e))
            })?;

        // 3. 检查 HTTP 状态码
        if !res.status().is_success() {
            let status = res.status();
            let error_text = res.text().await.unwrap_or_default();
            return Err(RelayError::BackendFailure(format!(
                "Ollama API Error: Status {}, Body: {}",
                status, error_text
            )));
        }

        // 4. 解析 JSON 响应
        let response_data: OllamaChatResponse = res.json().await.map_err(|e| {
            RelayError::BackendFailure(format!("Failed to deserialize Ollama response JSON: {}", e))
        })?;

        // 5. 提取文本内容
        // 路径: message -> content
        match response_data.message.and_then(|m| m.content) {
            Some(content) => Ok(ChatMessage::assistant(content)),
            None => Err(RelayError::BackendFailure(format!(
                "Response JSON structure mismatch: no message content (done={:?})",
                response_data.done
            ))),
        }
    }
}
