//! Extract browser commands from free-form model output.
//!
//! Models wrap command objects in prose, code fences, or arrays, and
//! occasionally emit broken JSON. Parsing never fails: whatever cannot be
//! understood is dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::command::{BrowserCommand, RawCommand};

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("valid fenced block regex")
});

/// Parse every recognizable command in `text`, in order of appearance.
pub fn parse_commands(text: &str) -> Vec<BrowserCommand> {
    let body = FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);

    let trimmed = body.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
            return items.into_iter().filter_map(command_from_value).collect();
        }
    }

    scan_objects(body)
}

fn command_from_value(value: serde_json::Value) -> Option<BrowserCommand> {
    serde_json::from_value::<RawCommand>(value)
        .ok()
        .and_then(RawCommand::into_command)
}

/// Parse every balanced `{...}` span that holds a command.
///
/// An unclosed `{`, or a span that is not valid JSON, is skipped one
/// character at a time so that objects nested in or following it are still
/// found. Quotes outside any object are prose.
fn scan_objects(text: &str) -> Vec<BrowserCommand> {
    let mut commands = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        let Some(end) = find_object_end(text, start) else {
            pos = start + 1;
            continue;
        };

        match serde_json::from_str::<RawCommand>(&text[start..=end]) {
            Ok(raw) => {
                commands.extend(raw.into_command());
                pos = end + 1;
            }
            Err(e) => {
                tracing::debug!("Skipping unparseable command object: {}", e);
                pos = start + 1;
            }
        }
    }

    commands
}

/// Byte index of the `}` closing the object that opens at `start`.
///
/// Braces inside string literals do not count, and a backslash escapes the
/// next character inside a string.
fn find_object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            if escape_next {
                escape_next = false;
                continue;
            }
            match ch {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Target;

    #[test]
    fn test_plain_answer_has_no_commands() {
        assert!(parse_commands("The capital of France is Paris.").is_empty());
        assert!(parse_commands("").is_empty());
    }

    #[test]
    fn test_single_object_in_prose() {
        let text = r#"Thought: I should search.
Action: {"command": "search", "content": "rust async"}"#;
        assert_eq!(
            parse_commands(text),
            vec![BrowserCommand::Search { query: "rust async".into() }]
        );
    }

    #[test]
    fn test_fenced_block() {
        let text = "Let me open it.\n```json\n{\"command\": \"navigate\", \"url\": \"https://example.com\"}\n```";
        assert_eq!(
            parse_commands(text),
            vec![BrowserCommand::Navigate { url: "https://example.com".into() }]
        );
    }

    #[test]
    fn test_array_short_circuit() {
        let text = r#"[{"command":"new_tab","url":"https://a.com"},{"command":"read_page"},{"command":"nope"}]"#;
        assert_eq!(
            parse_commands(text),
            vec![
                BrowserCommand::NewTab { url: Some("https://a.com".into()) },
                BrowserCommand::ReadPage,
            ]
        );
    }

    #[test]
    fn test_broken_array_falls_back_to_scanner() {
        let text = r#"[{"command":"back"}, {"command":"refresh"},"#;
        assert_eq!(
            parse_commands(text),
            vec![BrowserCommand::Back, BrowserCommand::Refresh]
        );
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let text = r#"{"command":"type","selector":"input[name=\"q\"]","text":"a } b { c"}"#;
        assert_eq!(
            parse_commands(text),
            vec![BrowserCommand::Type {
                target: Target::Selector(r#"input[name="q"]"#.into()),
                text: "a } b { c".into(),
            }]
        );
    }

    #[test]
    fn test_find_object_end_spans_nesting() {
        let text = r#"x {"a":{"b":1}} y {"c":"}"}"#;
        assert_eq!(find_object_end(text, 2), Some(14));
        assert_eq!(find_object_end(text, 18), Some(text.len() - 1));
        assert_eq!(find_object_end(r#"{"a":1"#, 0), None);
    }

    #[test]
    fn test_valid_and_invalid_spans_mixed() {
        let text = r#"First {"command":"scroll_down"} then {broken json} and
{"command":"teleport"} also {"url":"x"} finally {"command":"click","selector":"7"}
and a stray } brace plus "quoted {text}" in prose {"command":"scroll_up"}"#;
        assert_eq!(
            parse_commands(text),
            vec![
                BrowserCommand::ScrollDown,
                BrowserCommand::Click { target: Target::Id(7) },
                BrowserCommand::ScrollUp,
            ]
        );
    }

    #[test]
    fn test_unterminated_object_dropped() {
        let text = r#"{"command":"read_page"} {"command":"search","content":"x""#;
        assert_eq!(parse_commands(text), vec![BrowserCommand::ReadPage]);
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let text = r#"{"command":"search","content":"say \"hi\" {now}"}"#;
        assert_eq!(
            parse_commands(text),
            vec![BrowserCommand::Search { query: r#"say "hi" {now}"#.into() }]
        );
    }

    #[test]
    fn test_unclosed_brace_before_command() {
        let text = r#"I will use {placeholder syntax here. {"command":"read_page"}"#;
        assert_eq!(parse_commands(text), vec![BrowserCommand::ReadPage]);
    }

    #[test]
    fn test_unbalanced_quote_before_command() {
        let text = r#"Bad: {oops "unterminated} Good: {"command":"read_page"}"#;
        assert_eq!(parse_commands(text), vec![BrowserCommand::ReadPage]);
    }

    #[test]
    fn test_command_nested_in_invalid_span() {
        let text = r#"{note: {"command":"back"} then {"command":"forward"}}"#;
        assert_eq!(
            parse_commands(text),
            vec![BrowserCommand::Back, BrowserCommand::Forward]
        );
    }
}
