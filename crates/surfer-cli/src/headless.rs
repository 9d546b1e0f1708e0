//! A browser without a rendering engine.
//!
//! Tabs and their back/forward history are tracked in memory; reading a page
//! fetches the current URL and flattens the HTML to text. There is no DOM, so
//! clicking and typing are reported as unsupported.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;
use surfer_agent::{Browser, BrowserError, BrowserResult};

/// Page text handed back to the model is cut to this many characters
pub const MAX_PAGE_CHARS: usize = 8000;

const BLANK_PAGE: &str = "about:blank";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<title\b.*?</title\s*>|<!--.*?-->")
        .unwrap()
});
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").unwrap());
static BLOCK_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:br|hr)\b[^>]*>|</(?:p|div|li|tr|h[1-6]|section|article|header|footer|ul|ol|table|blockquote|pre)\s*>")
        .unwrap()
});
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static INLINE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\x0C]+").unwrap());

#[derive(Debug)]
struct Tab {
    history: Vec<String>,
    position: usize,
}

impl Tab {
    fn new(url: String) -> Self {
        Self {
            history: vec![url],
            position: 0,
        }
    }

    fn current(&self) -> &str {
        &self.history[self.position]
    }

    fn visit(&mut self, url: String) {
        self.history.truncate(self.position + 1);
        self.history.push(url);
        self.position = self.history.len() - 1;
    }

    fn back(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn forward(&mut self) {
        if self.position + 1 < self.history.len() {
            self.position += 1;
        }
    }
}

#[derive(Debug, Default)]
struct Tabs {
    tabs: Vec<Tab>,
    active: usize,
}

impl Tabs {
    fn open(&mut self, url: String) {
        self.tabs.push(Tab::new(url));
        self.active = self.tabs.len() - 1;
    }

    fn active_mut(&mut self) -> BrowserResult<&mut Tab> {
        self.tabs.get_mut(self.active).ok_or(BrowserError::NoActiveTab)
    }

    fn close_active(&mut self) -> BrowserResult<()> {
        if self.active >= self.tabs.len() {
            return Err(BrowserError::NoActiveTab);
        }
        self.tabs.remove(self.active);
        self.active = self.active.min(self.tabs.len().saturating_sub(1));
        Ok(())
    }
}

/// A [`Browser`] backed by plain HTTP fetches
pub struct HeadlessBrowser {
    client: reqwest::Client,
    search_engine: String,
    tabs: Mutex<Tabs>,
}

impl HeadlessBrowser {
    /// `search_engine` is a URL prefix the encoded query is appended to
    pub fn new(search_engine: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("surfer/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            search_engine: search_engine.into(),
            tabs: Mutex::new(Tabs::default()),
        }
    }

    /// URL of the active tab, if any
    pub fn current_url(&self) -> Option<String> {
        let tabs = self.tabs.lock();
        tabs.tabs.get(tabs.active).map(|t| t.current().to_string())
    }

    /// Number of open tabs
    pub fn tab_count(&self) -> usize {
        self.tabs.lock().tabs.len()
    }

    fn open_tab(&self, url: String) {
        tracing::debug!(%url, "Opening tab");
        self.tabs.lock().open(url);
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}{}", self.search_engine, urlencoding::encode(query))
    }
}

/// Add `https://` unless the URL already names a scheme we understand
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") || url.starts_with("about:") || url.starts_with("file:") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// The site's own search URL for `query`, for the sites we know
pub fn site_search_url(site: &str, query: &str) -> Option<String> {
    let site = site.trim().to_lowercase();
    let has = |names: &[&str]| names.iter().any(|n| site.contains(n));

    let template = if has(&["bilibili", "哔哩哔哩", "b站"]) {
        "https://search.bilibili.com/all?keyword="
    } else if has(&["youtube", "油管"]) {
        "https://www.youtube.com/results?search_query="
    } else if has(&["github"]) {
        "https://github.com/search?q="
    } else if has(&["csdn"]) {
        "https://so.csdn.net/so/search?q="
    } else if has(&["zhihu", "知乎"]) {
        "https://www.zhihu.com/search?type=content&q="
    } else if has(&["weibo", "微博"]) {
        "https://s.weibo.com/weibo?q="
    } else if has(&["taobao", "淘宝"]) {
        "https://s.taobao.com/search?q="
    } else if has(&["jd", "京东"]) {
        "https://search.jd.com/Search?keyword="
    } else if has(&["google", "谷歌"]) {
        "https://www.google.com/search?q="
    } else if has(&["baidu", "百度"]) {
        "https://www.baidu.com/s?wd="
    } else if has(&["bing", "必应"]) {
        "https://www.bing.com/search?q="
    } else {
        return None;
    };

    Some(format!("{}{}", template, urlencoding::encode(query)))
}

/// Flatten an HTML document to readable text.
///
/// Scripts, styles, the title and comments are dropped, block-level closing tags become
/// line breaks, runs of whitespace collapse and blank lines are removed.
pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN_BLOCKS.replace_all(html, " ");
    let with_breaks = BLOCK_BREAKS.replace_all(&visible, "\n");
    let stripped = TAGS.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(|line| INLINE_SPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contents of the `<title>` element, whitespace-collapsed
pub fn page_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            decode_entities(m.as_str())
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|t| !t.is_empty())
}

/// Cut page text to `MAX_PAGE_CHARS` characters, marking the cut.
fn clip_page(mut text: String) -> String {
    if let Some((at, _)) = text.char_indices().nth(MAX_PAGE_CHARS) {
        text.truncate(at);
        text.push_str("\n[page truncated]");
    }
    text
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl Browser for HeadlessBrowser {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let url = normalize_url(url);
        let mut tabs = self.tabs.lock();
        match tabs.active_mut() {
            Ok(tab) => tab.visit(url),
            Err(_) => tabs.open(url),
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> BrowserResult<()> {
        if query.trim().is_empty() {
            return Ok(());
        }
        self.open_tab(self.search_url(query));
        Ok(())
    }

    async fn search_on_site(&self, query: &str, site: &str) -> BrowserResult<()> {
        if query.trim().is_empty() {
            return Ok(());
        }
        match site_search_url(site, query) {
            Some(url) => {
                self.open_tab(url);
                Ok(())
            }
            None => self.search(&format!("{} {}", query, site)).await,
        }
    }

    async fn new_tab(&self, url: Option<&str>) -> BrowserResult<()> {
        let url = url
            .filter(|u| !u.trim().is_empty())
            .map(normalize_url)
            .unwrap_or_else(|| BLANK_PAGE.to_string());
        self.open_tab(url);
        Ok(())
    }

    async fn close_current_tab(&self) -> BrowserResult<()> {
        self.tabs.lock().close_active()
    }

    async fn go_back(&self) -> BrowserResult<()> {
        self.tabs.lock().active_mut()?.back();
        Ok(())
    }

    async fn go_forward(&self) -> BrowserResult<()> {
        self.tabs.lock().active_mut()?.forward();
        Ok(())
    }

    async fn refresh(&self) -> BrowserResult<()> {
        // Pages are fetched on every read, so there is nothing to reload
        self.tabs.lock().active_mut().map(|_| ())
    }

    async fn scroll(&self, delta_y: i32) -> BrowserResult<()> {
        tracing::debug!(delta_y, "Scroll ignored; read_page returns the whole page");
        self.tabs.lock().active_mut().map(|_| ())
    }

    async fn read_page(&self) -> BrowserResult<String> {
        let url = self.current_url().ok_or(BrowserError::NoActiveTab)?;
        if url.starts_with("about:") {
            return Ok(String::new());
        }

        tracing::debug!(%url, "Fetching page");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BrowserError::Load(e.to_string()))?;
        let html = response
            .text()
            .await
            .map_err(|e| BrowserError::Load(e.to_string()))?;

        let mut text = String::new();
        if let Some(title) = page_title(&html) {
            text.push_str(&format!("Title: {}\n", title));
        }
        text.push_str(&format!("URL: {}\n\n", url));
        text.push_str(&html_to_text(&html));
        Ok(clip_page(text))
    }

    async fn click_element(&self, _selector: &str) -> BrowserResult<()> {
        Err(BrowserError::Unsupported("clicking"))
    }

    async fn click_element_by_id(&self, _id: u32) -> BrowserResult<()> {
        Err(BrowserError::Unsupported("clicking"))
    }

    async fn type_text(&self, _selector: &str, _text: &str) -> BrowserResult<()> {
        Err(BrowserError::Unsupported("typing"))
    }

    async fn type_text_by_id(&self, _id: u32, _text: &str) -> BrowserResult<()> {
        Err(BrowserError::Unsupported("typing"))
    }
}
