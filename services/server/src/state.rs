//! 请求之间共享的应用状态

use relay_agent::{InferenceGateway, ModelBackend};
use relay_core::ModelSelector;
use std::sync::Arc;

/// 所有请求共享的只读状态
#[derive(Clone)]
pub struct AppState {
    /// 启动时构建一次的推理网关
    pub gateway: Arc<InferenceGateway>,
}

impl AppState {
    pub fn new(gateway: InferenceGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// 直接用后端 + 模型构建 (测试里注入桩后端时用)
    pub fn with_backend(backend: Arc<dyn ModelBackend>, model: ModelSelector) -> Self {
        Self::new(InferenceGateway::new(backend, model))
    }
}
