//! The browser collaborator the agent drives.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a [`Browser`] implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// No tab is open to act on
    #[error("no active tab")]
    NoActiveTab,

    /// The operation needs page interaction the browser cannot provide
    #[error("{0} is not supported by this browser")]
    Unsupported(&'static str),

    /// The target element could not be found
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// Loading or reading the page failed
    #[error("page load failed: {0}")]
    Load(String),

    /// Any other failure reported by the browser engine
    #[error("{0}")]
    Other(String),
}

pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Operations the agent can ask of the host browser.
///
/// Implementations own the tab list; every call acts on the current tab.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    async fn search(&self, query: &str) -> BrowserResult<()>;

    async fn search_on_site(&self, query: &str, site: &str) -> BrowserResult<()>;

    /// Open a tab; `None` opens a blank one
    async fn new_tab(&self, url: Option<&str>) -> BrowserResult<()>;

    async fn close_current_tab(&self) -> BrowserResult<()>;

    async fn go_back(&self) -> BrowserResult<()>;

    async fn go_forward(&self) -> BrowserResult<()>;

    async fn refresh(&self) -> BrowserResult<()>;

    /// Scroll vertically by `delta_y` pixels (negative scrolls up)
    async fn scroll(&self, delta_y: i32) -> BrowserResult<()>;

    /// Visible text of the current page
    async fn read_page(&self) -> BrowserResult<String>;

    async fn click_element(&self, selector: &str) -> BrowserResult<()>;

    /// Click the element tagged with a numeric agent id
    async fn click_element_by_id(&self, id: u32) -> BrowserResult<()>;

    async fn type_text(&self, selector: &str, text: &str) -> BrowserResult<()>;

    /// Type into the element tagged with a numeric agent id
    async fn type_text_by_id(&self, id: u32, text: &str) -> BrowserResult<()>;
}
