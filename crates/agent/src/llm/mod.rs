use async_trait::async_trait;
use relay_core::{BackendKind, ChatMessage, ModelSelector, RelayConfig, RelayError};
use std::sync::Arc;

pub mod ollama;
pub mod openai;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// 模型后端抽象接口 (ModelBackend)
///
/// 该 Trait 定义了与推理后端进行单轮对话的通用行为。
///
/// # 线程安全
/// 该 Trait 继承了 `Send + Sync`，这意味着实现该 Trait 的对象可以在线程间安全地传递和共享。
/// 服务启动时构建一次，之后通过 `Arc<dyn ModelBackend>` 在所有请求间共享；
/// 测试可以注入自己的实现，而不用修改任何进程级状态。
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// 后端名称，仅用于日志
    fn name(&self) -> &str;

    /// 执行一次对话请求 (Chat Completion)
    ///
    /// # 参数 (Arguments)
    ///
    /// * `model` - 目标模型标识，例如 `gemma3:4b`。
    /// * `messages` - 按顺序发送的消息，中转服务只会发一条 `user` 消息。
    ///
    /// # 返回值 (Returns)
    ///
    /// * `Ok(ChatMessage)` - 后端生成的回复消息。
    /// * `Err(RelayError::BackendUnavailable)` - 连接失败、超时等传输层错误。
    /// * `Err(RelayError::BackendFailure)` - 后端返回错误状态，或者响应里没有可用的内容。
    async fn chat(
        &self,
        model: &ModelSelector,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage, RelayError>;
}

/// 根据配置构建后端实例 (进程内只调用一次)
pub fn build_backend(cfg: &RelayConfig) -> Result<Arc<dyn ModelBackend>, RelayError> {
    let backend: Arc<dyn ModelBackend> = match cfg.backend {
        BackendKind::Ollama => Arc::new(OllamaBackend::new(
            &cfg.backend_url,
            cfg.request_timeout(),
        )?),
        BackendKind::OpenAi => Arc::new(OpenAiBackend::new_with_base_url(
            cfg.api_key.as_deref().unwrap_or_default(),
            &cfg.backend_url,
            cfg.request_timeout(),
        )?),
    };

    tracing::info!(
        backend = backend.name(),
        url = %cfg.backend_url,
        "Inference backend configured"
    );
    Ok(backend)
}
