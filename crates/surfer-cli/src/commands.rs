//! Slash commands for interactive mode

use surfer_agent::Mode;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Start a new conversation
    Reset,
    /// Switch between tool and chat mode
    ChangeMode(Mode),
    /// Switch to another model
    ChangeModel(String),
    /// Show a message to the user (not sent to the model)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command. `None` if `input` is not one.
pub fn execute_command(input: &str, current_mode: Mode, current_model: &str) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next().unwrap_or_default().to_lowercase();
    let args = parts.next().map(str::trim).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "reset" | "clear" | "c" => CommandResult::Reset,

        "quit" | "exit" | "q" => CommandResult::Exit,

        "mode" => {
            if args.is_empty() {
                CommandResult::Message(format!("Current mode: {}", mode_name(current_mode)))
            } else {
                match args.parse::<Mode>() {
                    Ok(mode) => CommandResult::ChangeMode(mode),
                    Err(e) => CommandResult::Message(e),
                }
            }
        }

        "model" | "m" => {
            if args.is_empty() {
                CommandResult::Message(format!("Current model: {}", current_model))
            } else {
                CommandResult::ChangeModel(args.to_string())
            }
        }

        _ => CommandResult::Unknown(command),
    })
}

pub fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Tool => "tool",
        Mode::Chat => "chat",
    }
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?         Show this help message
  /mode [tool|chat]     Show or switch the mode
  /model, /m [name]     Show or switch the model
  /reset, /clear, /c    Start a new conversation
  /quit, /exit, /q      Exit surfer

Press Ctrl-C to cancel the current request."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_command() {
        assert_eq!(execute_command("hello", Mode::Tool, "m"), None);
    }

    #[test]
    fn test_mode_switch() {
        assert_eq!(
            execute_command("/mode chat", Mode::Tool, "m"),
            Some(CommandResult::ChangeMode(Mode::Chat))
        );
        assert_eq!(
            execute_command("/mode", Mode::Chat, "m"),
            Some(CommandResult::Message("Current mode: chat".into()))
        );
        assert!(matches!(
            execute_command("/mode fly", Mode::Tool, "m"),
            Some(CommandResult::Message(_))
        ));
    }

    #[test]
    fn test_model_and_misc() {
        assert_eq!(
            execute_command("/model qwen-plus", Mode::Tool, "deepseek-chat"),
            Some(CommandResult::ChangeModel("qwen-plus".into()))
        );
        assert_eq!(
            execute_command("/m", Mode::Tool, "deepseek-chat"),
            Some(CommandResult::Message("Current model: deepseek-chat".into()))
        );
        assert_eq!(execute_command("/reset", Mode::Tool, "m"), Some(CommandResult::Reset));
        assert_eq!(execute_command("/q", Mode::Tool, "m"), Some(CommandResult::Exit));
        assert_eq!(
            execute_command("/Dance now", Mode::Tool, "m"),
            Some(CommandResult::Unknown("dance".into()))
        );
    }
}
