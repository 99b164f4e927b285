use thiserror::Error;

/// 返回给调用方的固定错误文案，不包含任何后端细节
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing the request";

/// 请求体无法解析时返回的固定文案
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid request payload";

/// 统一的中转服务错误定义
/// 使用 `thiserror` 宏自动生成 Display 和 Error trait
#[derive(Error, Debug)]
pub enum RelayError {
    // =================================================================
    // 1. 请求类 (Request)
    // =================================================================
    /// 请求体不是合法 JSON 对象，或者 content 字段类型错误
    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    // =================================================================
    // 2. 推理后端类 (Backend)
    // 注意：Core 不直接依赖 reqwest，用 String 包装错误信息
    // =================================================================
    /// 后端连不上、超时、传输层出错
    #[error("Inference backend unavailable: {0}")]
    BackendUnavailable(String),

    /// 后端有响应，但返回了错误状态或者无法解析的内容
    #[error("Inference backend failure: {0}")]
    BackendFailure(String),

    // =================================================================
    // 3. 系统与配置类 (System & Config)
    // =================================================================
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// 是否属于调用方的问题 (对应 HTTP 4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::InvalidPayload(_))
    }

    /// 可以安全返回给调用方的文案
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::InvalidPayload(_) => INVALID_PAYLOAD_MESSAGE,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl From<config::ConfigError> for RelayError {
    fn from(err: config::ConfigError) -> Self {
        RelayError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_never_leak_detail() {
        let err = RelayError::BackendFailure("status 500: CUDA out of memory".to_string());
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);
        assert!(!err.is_client_error());

        let err = RelayError::BackendUnavailable("connection refused".to_string());
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn invalid_payload_is_client_error() {
        let err = RelayError::InvalidPayload("expected value at line 1".to_string());
        assert!(err.is_client_error());
        assert_eq!(err.public_message(), INVALID_PAYLOAD_MESSAGE);
    }
}
