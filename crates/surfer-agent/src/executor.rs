//! Run parsed commands against the browser and collect observations.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::browser::{Browser, BrowserResult};
use crate::command::{BrowserCommand, Target};

/// Pause after each command when a batch has more than one, so the page can settle
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Pixels scrolled by `scroll_down` / `scroll_up`
pub const SCROLL_STEP: i32 = 300;

/// Observation used when no command produced output
pub const NO_OUTPUT_OBSERVATION: &str = "Action executed successfully.";

/// Result of running a batch of commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Text to feed back to the model
    pub observation: String,
    /// Number of commands that actually ran
    pub executed: usize,
    /// Whether the batch stopped early because of cancellation
    pub cancelled: bool,
}

/// Executes commands one at a time against a [`Browser`]
#[derive(Clone)]
pub struct CommandExecutor {
    browser: Arc<dyn Browser>,
    settle_delay: Duration,
}

impl CommandExecutor {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Self {
            browser,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// Override the inter-command pause
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Execute one command. Returns the observation text, if any.
    ///
    /// Browser failures are reported as `Error: <message>` observations.
    pub async fn execute(&self, command: &BrowserCommand) -> Option<String> {
        tracing::debug!(command = command.name(), "Executing browser command");
        match self.dispatch(command).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(command = command.name(), "Browser command failed: {}", e);
                Some(crate::Error::from(e).user_message())
            }
        }
    }

    async fn dispatch(&self, command: &BrowserCommand) -> BrowserResult<Option<String>> {
        let browser = &self.browser;
        match command {
            BrowserCommand::Search { query } => {
                if !query.trim().is_empty() {
                    browser.search(query).await?;
                }
            }
            BrowserCommand::SiteSearch { query, site } => {
                if query.trim().is_empty() {
                    return Ok(None);
                }
                if site.trim().is_empty() {
                    browser.search(query).await?;
                } else {
                    browser.search_on_site(query, site).await?;
                }
            }
            BrowserCommand::Navigate { url } => {
                if !url.trim().is_empty() {
                    browser.navigate(url).await?;
                }
            }
            BrowserCommand::NewTab { url } => browser.new_tab(url.as_deref()).await?,
            BrowserCommand::CloseTab => browser.close_current_tab().await?,
            BrowserCommand::ReadPage => return browser.read_page().await.map(Some),
            BrowserCommand::Back => browser.go_back().await?,
            BrowserCommand::Forward => browser.go_forward().await?,
            BrowserCommand::Refresh => browser.refresh().await?,
            BrowserCommand::ScrollDown => browser.scroll(SCROLL_STEP).await?,
            BrowserCommand::ScrollUp => browser.scroll(-SCROLL_STEP).await?,
            BrowserCommand::Click { target } => match target {
                Target::Id(id) => browser.click_element_by_id(*id).await?,
                Target::Selector(selector) if selector.trim().is_empty() => {}
                Target::Selector(selector) => browser.click_element(selector).await?,
            },
            BrowserCommand::Type { target, text } => match target {
                Target::Id(id) => browser.type_text_by_id(*id, text).await?,
                Target::Selector(selector) if selector.trim().is_empty() => {}
                Target::Selector(selector) => browser.type_text(selector, text).await?,
            },
        }
        Ok(None)
    }

    /// Execute commands strictly in order.
    ///
    /// Cancellation is checked before each command and interrupts the settle
    /// delay; commands already started are allowed to finish.
    pub async fn execute_all(
        &self,
        commands: &[BrowserCommand],
        cancel: &CancellationToken,
    ) -> ExecutionReport {
        let mut observations = Vec::new();
        let mut executed = 0;
        let mut cancelled = false;
        let pause = commands.len() > 1;

        for command in commands {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            if let Some(output) = self.execute(command).await {
                observations.push(format!("Command '{}' result: {}", command.name(), output));
            }
            executed += 1;

            if pause {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.settle_delay) => {}
                }
            }
        }

        let observation = if observations.is_empty() {
            NO_OUTPUT_OBSERVATION.to_string()
        } else {
            observations.join("\n")
        };

        ExecutionReport {
            observation,
            executed,
            cancelled,
        }
    }
}
