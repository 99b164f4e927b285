// crates/core/src/enums.rs
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")] // 序列化为 "user", "assistant"
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 推理后端的接入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    #[default]
    Ollama, // 原生 /api/chat
    OpenAi, // OpenAI 兼容的 /v1/chat/completions
}

/// 单个请求的处理阶段，只能单向推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RelayStage {
    Received,
    Validating,
    Invoking,
    Succeeded,
    Failed,
    Responded,
}

impl RelayStage {
    /// 下一阶段是否合法
    pub fn can_advance_to(self, next: RelayStage) -> bool {
        use RelayStage::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Invoking)
                | (Invoking, Succeeded)
                | (Invoking, Failed)
                | (Succeeded, Responded)
                | (Failed, Responded)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RelayStage::Succeeded | RelayStage::Failed)
    }
}
