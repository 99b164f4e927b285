pub mod gateway;
pub mod llm;

pub use gateway::InferenceGateway;
pub use llm::{build_backend, ModelBackend};
