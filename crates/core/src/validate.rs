use crate::types::ChatRequest;

/// content 缺失或为空时转发给模型的默认问题
pub const DEFAULT_PROMPT: &str = "Why is the sky blue?";

/// 取出要转发的 prompt
///
/// 非空内容原样返回 (不 trim、不截断)；缺失、null 或空字符串时返回 [`DEFAULT_PROMPT`]。
/// 这里没有失败分支：没有输入是一种合法情况。
pub fn normalize_prompt(request: ChatRequest) -> String {
    match request.content {
        Some(content) if !content.is_empty() => content,
        _ => DEFAULT_PROMPT.to_string(),
    }
}

pub mod validate {
    /// 核心校验宏：如果条件为假，则返回格式化的错误信息
    #[macro_export]
    macro_rules! ensure_that {
        ($cond:expr, $($arg:tt)+) => {
            if !($cond) {
                return Err(::anyhow::anyhow!($($arg)+));
            }
        };
    }

    /// 校验字符串、Vec、HashMap 等集合不为空
    #[macro_export]
    macro_rules! ensure_not_empty {
        ($container:expr, $($arg:tt)+) => {
            if $container.is_empty() {
                return Err(::anyhow::anyhow!($($arg)+));
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_content_is_forwarded_verbatim() {
        for content in [
            "Explain quantum computing",
            "  leading and trailing spaces  ",
            " ",
            "多语言 prompt ✓",
        ] {
            assert_eq!(normalize_prompt(ChatRequest::new(content)), content);
        }
    }

    #[test]
    fn missing_or_empty_content_uses_default() {
        assert_eq!(normalize_prompt(ChatRequest::default()), DEFAULT_PROMPT);
        assert_eq!(normalize_prompt(ChatRequest::new("")), DEFAULT_PROMPT);
    }

    #[test]
    fn long_content_is_not_truncated() {
        let content = "a".repeat(64 * 1024);
        assert_eq!(normalize_prompt(ChatRequest::new(content.clone())).len(), content.len());
    }
}
