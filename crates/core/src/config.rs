use crate::enums::BackendKind;
use crate::error::RelayError;
use crate::types::{ModelSelector, DEFAULT_MODEL};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use std::time::Duration;

/// 环境变量前缀，例如 RELAY_PORT=8080
pub const ENV_PREFIX: &str = "RELAY";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:11434";
/// 与常见 JSON body parser 的默认上限一致 (100 KiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;
pub const DEFAULT_LOG_DIR: &str = "logs";

/// --- 服务配置 ---
/// 启动时加载一次，之后只读
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 目标模型 (例如 gemma3:4b)
    pub model: String,
    /// 后端类型：ollama | openai
    #[serde(deserialize_with = "deserialize_backend")]
    pub backend: BackendKind,
    /// 后端根地址
    pub backend_url: String,
    /// OpenAI 兼容后端需要的 Key (Ollama 不需要)
    #[serde(default)]
    pub api_key: Option<String>,
    /// 后端 HTTP 客户端超时，不设置则一直等待
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// 请求体大小上限
    pub max_body_bytes: usize,
    /// 日志文件目录
    pub log_dir: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            backend: BackendKind::default(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_key: None,
            request_timeout_secs: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

fn deserialize_backend<'de, D>(deserializer: D) -> Result<BackendKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    BackendKind::from_str(raw.trim())
        .map_err(|_| serde::de::Error::custom(format!("unknown backend kind: {}", raw)))
}

impl RelayConfig {
    /// 只包含默认值的 builder，调用方可以继续叠加 source / override
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, RelayError> {
        let builder = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("model", DEFAULT_MODEL)?
            .set_default("backend", BackendKind::default().to_string())?
            .set_default("backend_url", DEFAULT_BACKEND_URL)?
            .set_default("max_body_bytes", DEFAULT_MAX_BODY_BYTES as i64)?
            .set_default("log_dir", DEFAULT_LOG_DIR)?;
        Ok(builder)
    }

    /// 默认值 + `RELAY_*` 环境变量
    /// 调用前应先执行 `dotenvy::dotenv()`，这样 .env 里的值也会生效
    pub fn from_env() -> Result<Self, RelayError> {
        let cfg = Self::defaults()?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: Config) -> Result<Self, RelayError> {
        let parsed: RelayConfig = cfg.try_deserialize()?;
        parsed
            .validate()
            .map_err(|e| RelayError::Config(e.to_string()))?;
        Ok(parsed)
    }

    fn validate(&self) -> anyhow::Result<()> {
        crate::ensure_not_empty!(self.model.trim(), "model must not be empty");
        crate::ensure_not_empty!(self.backend_url.trim(), "backend_url must not be empty");
        crate::ensure_that!(self.port != 0, "port must be non-zero");
        crate::ensure_that!(self.max_body_bytes > 0, "max_body_bytes must be positive");
        crate::ensure_that!(
            self.request_timeout_secs != Some(0),
            "request_timeout_secs must be positive when set"
        );
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_selector(&self) -> ModelSelector {
        ModelSelector::new(self.model.clone())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = RelayConfig::from_config(RelayConfig::defaults().unwrap().build().unwrap())
            .unwrap();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.model_selector().as_str(), "gemma3:4b");
        assert_eq!(cfg.backend, BackendKind::Ollama);
        assert_eq!(cfg.backend_url, "http://127.0.0.1:11434");
        assert_eq!(cfg.max_body_bytes, 100 * 1024);
        assert!(cfg.request_timeout().is_none());
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let built = RelayConfig::defaults()
            .unwrap()
            .set_override("port", 8080_i64)
            .unwrap()
            .set_override("model", "llama3.2:1b")
            .unwrap()
            .set_override("backend", "OpenAI")
            .unwrap()
            .set_override("request_timeout_secs", 30_i64)
            .unwrap()
            .build()
            .unwrap();
        let cfg = RelayConfig::from_config(built).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.model, "llama3.2:1b");
        assert_eq!(cfg.backend, BackendKind::OpenAi);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for (key, value) in [("model", "  "), ("backend", "llamacpp")] {
            let built = RelayConfig::defaults()
                .unwrap()
                .set_override(key, value)
                .unwrap()
                .build()
                .unwrap();
            let err = RelayConfig::from_config(built).unwrap_err();
            assert!(matches!(err, RelayError::Config(_)), "{key}: {err:?}");
        }

        let built = RelayConfig::defaults()
            .unwrap()
            .set_override("port", 0_i64)
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(
            RelayConfig::from_config(built),
            Err(RelayError::Config(_))
        ));
    }
}
