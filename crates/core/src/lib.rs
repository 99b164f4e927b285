pub mod config;
pub mod enums;
pub mod error;
pub mod types;
pub mod validate;

// 导出让外部使用
pub use self::config::*;
pub use enums::*;
pub use error::*;
pub use types::*;
pub use validate::{normalize_prompt, DEFAULT_PROMPT};
