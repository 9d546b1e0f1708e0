//! Typed browser commands and their wire form.

use serde::Deserialize;

/// An element reference: either a CSS selector or a numeric agent id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Selector(String),
    Id(u32),
}

impl Target {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u32>() {
            Ok(id) => Target::Id(id),
            Err(_) => Target::Selector(trimmed.to_string()),
        }
    }
}

/// One action the model asked the browser to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCommand {
    Search { query: String },
    SiteSearch { query: String, site: String },
    Navigate { url: String },
    NewTab { url: Option<String> },
    CloseTab,
    ReadPage,
    Back,
    Forward,
    Refresh,
    ScrollDown,
    ScrollUp,
    Click { target: Target },
    Type { target: Target, text: String },
}

impl BrowserCommand {
    /// The wire name of this command
    pub fn name(&self) -> &'static str {
        match self {
            BrowserCommand::Search { .. } => "search",
            BrowserCommand::SiteSearch { .. } => "site_search",
            BrowserCommand::Navigate { .. } => "navigate",
            BrowserCommand::NewTab { .. } => "new_tab",
            BrowserCommand::CloseTab => "close_tab",
            BrowserCommand::ReadPage => "read_page",
            BrowserCommand::Back => "back",
            BrowserCommand::Forward => "forward",
            BrowserCommand::Refresh => "refresh",
            BrowserCommand::ScrollDown => "scroll_down",
            BrowserCommand::ScrollUp => "scroll_up",
            BrowserCommand::Click { .. } => "click",
            BrowserCommand::Type { .. } => "type",
        }
    }
}

/// A command object as the model writes it.
///
/// Every field but `command` is optional; the common capitalized spellings
/// are accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct RawCommand {
    #[serde(default, alias = "Command", alias = "COMMAND")]
    pub command: Option<String>,
    #[serde(default, alias = "Url", alias = "URL")]
    pub url: Option<String>,
    #[serde(default, alias = "Content", alias = "query", alias = "Query")]
    pub content: Option<String>,
    #[serde(default, alias = "Site")]
    pub site: Option<String>,
    #[serde(default, alias = "Selector")]
    pub selector: Option<String>,
    #[serde(default, alias = "Text")]
    pub text: Option<String>,
}

impl RawCommand {
    /// Convert to a typed command. `None` for a missing or unknown tag.
    pub fn into_command(self) -> Option<BrowserCommand> {
        let name = self.command?;
        let name = name.trim().to_ascii_lowercase();
        let content = self.content.unwrap_or_default();
        let selector = self.selector.unwrap_or_default();

        let command = match name.as_str() {
            "search" => BrowserCommand::Search { query: content },
            "site_search" => BrowserCommand::SiteSearch {
                query: content,
                site: self.site.unwrap_or_default(),
            },
            "navigate" => BrowserCommand::Navigate {
                url: self.url.unwrap_or_default(),
            },
            "new_tab" => BrowserCommand::NewTab {
                url: self.url.filter(|u| !u.trim().is_empty()),
            },
            "close_tab" => BrowserCommand::CloseTab,
            "read_page" => BrowserCommand::ReadPage,
            "back" => BrowserCommand::Back,
            "forward" => BrowserCommand::Forward,
            "refresh" => BrowserCommand::Refresh,
            "scroll_down" => BrowserCommand::ScrollDown,
            "scroll_up" => BrowserCommand::ScrollUp,
            "click" => BrowserCommand::Click {
                target: Target::parse(&selector),
            },
            "type" => BrowserCommand::Type {
                target: Target::parse(&selector),
                text: self.text.unwrap_or_default(),
            },
            _ => return None,
        };
        Some(command)
    }
}
