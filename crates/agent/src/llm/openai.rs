use super::ModelBackend;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use relay_core::{ChatMessage, ModelSelector, RelayError, Role};
use std::time::Duration;

/// OpenAI 兼容接口 (vLLM、LM Studio、Ollama 的 /v1 等)
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
}

impl OpenAiBackend {
    /// 支持自定义 BaseUrl (例如 http://127.0.0.1:11434/v1)
    pub fn new_with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, RelayError> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url.trim_end_matches('/'));

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build reqwest client: {}", e)))?;

        // 默认 backoff 会对 429 重试最长 15 分钟；这里第一次失败就结束
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Ok(Self {
            client: Client::with_config(config)
                .with_http_client(http_client)
                .with_backoff(no_retry),
        })
    }
}

fn classify(err: OpenAIError) -> RelayError {
    match err {
        OpenAIError::Reqwest(e) => {
            RelayError::BackendUnavailable(format!("Failed to call OpenAI API: {}", e))
        }
        other => RelayError::BackendFailure(format!("OpenAI API Error: {}", other)),
    }
}

fn to_request_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let message = match msg.role {
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(msg.content.as_str())
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(msg.content.as_str())
            .build()?
            .into(),
    };
    Ok(message)
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        model: &ModelSelector,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage, RelayError> {
        // 1. 转换消息
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()
            .map_err(classify)?;

        // 2. 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(model.as_str())
            .messages(request_messages)
            .build()
            .map_err(classify)?;

        // 3. 发送请求
        tracing::debug!("Sending request to LLM model: {}", model);
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify)?;

        // 4. 提取内容，没有内容视为后端异常
        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .map(ChatMessage::assistant)
            .ok_or_else(|| {
                RelayError::BackendFailure(
                    "Response JSON structure mismatch: No message content in choices".to_string(),
                )
            })
    }
}
