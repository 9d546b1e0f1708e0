//! Base URL normalization for OpenAI-compatible vendors.
//!
//! Some vendors publish a base URL that is not the root of their
//! OpenAI-compatible API. Users paste whatever the vendor's console shows, so
//! known signatures are rewritten to the compatible root before
//! `/chat/completions` is appended.

use reqwest::Url;

/// Hosts whose compatible root is always `{scheme}://{host}/v1`.
const MINIMAX_SIGNATURES: &[&str] = &["minimax.io", "minimaxi.com"];

/// Hosts that serve the compatible API under a `compatible-mode` segment.
const DASHSCOPE_SIGNATURES: &[&str] = &["dashscope", "aliyuncs.com"];

const DASHSCOPE_COMPAT_SEGMENT: &str = "compatible-mode";

/// Normalize a user-supplied base URL to the vendor's compatible API root.
///
/// URLs that do not match a known vendor are only trimmed. A URL that cannot
/// be parsed is left trimmed rather than rejected; the request will then fail
/// with a transport error that names it.
pub fn normalize_base_url(raw: &str) -> String {
    let mut base = raw.trim().trim_end_matches('/').to_string();
    let lower = base.to_lowercase();

    if contains_any(&lower, MINIMAX_SIGNATURES) {
        if let Some(url) = parse_with_scheme(&base) {
            base = format!("{}/v1", origin(&url));
        }
    }

    if contains_any(&lower, DASHSCOPE_SIGNATURES) {
        if let Some(url) = parse_with_scheme(&base) {
            let path = url.path().trim_end_matches('/');
            let path_lower = path.to_lowercase();
            base = if !path_lower.contains(DASHSCOPE_COMPAT_SEGMENT) {
                format!("{}/{}/v1", origin(&url), DASHSCOPE_COMPAT_SEGMENT)
            } else if !path_lower.ends_with("/v1") {
                format!("{}{}/v1", origin(&url), path)
            } else {
                format!("{}{}", origin(&url), path)
            };
        }
    }

    base
}

/// Build the chat-completions endpoint for a user-supplied base URL
pub fn completions_url(raw: &str) -> String {
    format!("{}/chat/completions", normalize_base_url(raw))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn parse_with_scheme(base: &str) -> Option<Url> {
    let candidate = if base.to_lowercase().starts_with("http") {
        base.to_string()
    } else {
        format!("https://{}", base)
    };
    match Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some() => Some(url),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Leaving base URL unnormalized ({}): {}", e, base);
            None
        }
    }
}

fn origin(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_url_only_trimmed() {
        assert_eq!(
            normalize_base_url("  https://api.deepseek.com/v1/  "),
            "https://api.deepseek.com/v1"
        );
    }

    #[test]
    fn test_multiple_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://api.openai.com/v1///"),
            "https://api.openai.com/v1"
        );
    }

    #[test]
    fn test_dashscope_root_gets_compat_segment() {
        assert_eq!(
            completions_url("https://dashscope.aliyuncs.com"),
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
    }

    #[test]
    fn test_dashscope_compat_without_version() {
        assert_eq!(
            normalize_base_url("https://dashscope.aliyuncs.com/compatible-mode"),
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );
    }

    #[test]
    fn test_dashscope_already_normalized() {
        assert_eq!(
            normalize_base_url("https://dashscope.aliyuncs.com/compatible-mode/v1/"),
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );
    }

    #[test]
    fn test_dashscope_signature_is_case_insensitive() {
        assert_eq!(
            normalize_base_url("https://DashScope.Aliyuncs.com/api/v1"),
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );
    }

    #[test]
    fn test_dashscope_without_scheme() {
        assert_eq!(
            normalize_base_url("dashscope-intl.aliyuncs.com"),
            "https://dashscope-intl.aliyuncs.com/compatible-mode/v1"
        );
    }

    #[test]
    fn test_minimax_rewritten_to_v1_root() {
        assert_eq!(
            normalize_base_url("https://api.minimax.io/v1/text/chatcompletion_v2"),
            "https://api.minimax.io/v1"
        );
        assert_eq!(
            normalize_base_url("api.minimaxi.com"),
            "https://api.minimaxi.com/v1"
        );
    }

    #[test]
    fn test_port_preserved() {
        assert_eq!(
            normalize_base_url("http://dashscope.local:8080"),
            "http://dashscope.local:8080/compatible-mode/v1"
        );
    }

    #[test]
    fn test_generic_completions_url() {
        assert_eq!(
            completions_url("http://localhost:11434/v1/"),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
