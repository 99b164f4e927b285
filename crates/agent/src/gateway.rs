use crate::llm::ModelBackend;
use relay_core::{
    normalize_prompt, ChatMessage, ChatRequest, ChatResponse, ModelSelector, RelayError,
    RelayStage,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// 推理网关
///
/// 持有进程级共享的后端句柄和模型标识，启动时构建一次。
/// 每个请求独立：不重试、不缓存，也没有自己的超时。
#[derive(Clone)]
pub struct InferenceGateway {
    backend: Arc<dyn ModelBackend>,
    model: ModelSelector,
}

/// 单个请求的阶段记录，只允许单向推进
struct StageTracker {
    current: RelayStage,
}

impl StageTracker {
    fn start() -> Self {
        debug!(stage = %RelayStage::Received, "relay stage");
        Self {
            current: RelayStage::Received,
        }
    }

    fn advance(&mut self, next: RelayStage) {
        debug_assert!(
            self.current.can_advance_to(next),
            "illegal relay stage transition {} -> {}",
            self.current,
            next
        );
        debug!(from = %self.current, to = %next, "relay stage");
        self.current = next;
    }

    /// 成功或失败之后统一进入 Responded
    fn finish<T>(mut self, outcome: Result<T, RelayError>) -> Result<T, RelayError> {
        self.advance(if outcome.is_ok() {
            RelayStage::Succeeded
        } else {
            RelayStage::Failed
        });
        self.advance(RelayStage::Responded);
        outcome
    }
}

impl InferenceGateway {
    pub fn new(backend: Arc<dyn ModelBackend>, model: ModelSelector) -> Self {
        Self { backend, model }
    }

    pub fn model(&self) -> &ModelSelector {
        &self.model
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// 从原始请求体开始处理
    ///
    /// 只有 body 不是合法 JSON 时才会在进入网关之前失败 (对应传输层的 400)。
    pub async fn handle_body(&self, body: &[u8]) -> Result<ChatResponse, RelayError> {
        let request = ChatRequest::from_body(body).map_err(|e| {
            warn!("Rejected malformed chat payload: {}", e);
            e
        })?;
        self.handle(request).await
    }

    /// 规范化 prompt，作为唯一一条 user 消息发给后端
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, RelayError> {
        let trace_id = Uuid::new_v4();
        async move {
            let mut stages = StageTracker::start();
            stages.advance(RelayStage::Validating);
            let prompt = normalize_prompt(request);
            stages.advance(RelayStage::Invoking);
            let outcome = self.invoke(prompt).await;
            stages.finish(outcome)
        }
        .instrument(tracing::info_span!("relay", %trace_id, model = %self.model))
        .await
    }

    async fn invoke(&self, prompt: String) -> Result<ChatResponse, RelayError> {
        let messages = [ChatMessage::user(prompt)];

        match self.backend.chat(&self.model, &messages).await {
            Ok(reply) => {
                info!(
                    backend = self.backend.name(),
                    reply_len = reply.content.len(),
                    "Inference backend replied"
                );
                Ok(ChatResponse {
                    result: reply.content,
                })
            }
            Err(e) => {
                // 细节只进日志，不回给调用方
                error!(
                    backend = self.backend.name(),
                    error = %e,
                    "Failed to communicate with inference backend"
                );
                Err(e)
            }
        }
    }
}
