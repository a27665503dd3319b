//! Rendering sessions consumed by the fetch orchestrator.
//!
//! The orchestrator never talks to a browser or HTTP client directly. It asks a
//! [`SessionProvider`] for a fresh [`Page`], drives it through navigation,
//! waits, clicks and scrolls, and closes it when the listing URL is done.
//!
//! # Providers
//!
//! | Provider | Module | Interactions |
//! |----------|--------|--------------|
//! | Static HTTP | [`http`] | Navigation, selector checks, link clicks |
//! | Browser | external | Everything, including script-driven buttons |
//!
//! A browser-backed provider lives outside this crate and implements the same
//! two traits.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

pub mod cookies;
pub mod http;

pub use http::HttpSessionProvider;

/// User agent sent when the configuration does not name one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36 Edg/122.0.2365.92";

/// A single open page in a rendering session.
///
/// Every method is a suspension point. Implementations own whatever connection
/// or process backs the page and release it in [`Page::close`].
pub trait Page {
    /// Navigate to `url` and make its content current.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Wait until `selector` matches something, failing with
    /// [`crate::error::ScrapeError::Render`] once `timeout` elapses.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Snapshot of the current document (HTML or raw response body).
    async fn content(&mut self) -> Result<String>;

    /// Whether `selector` currently matches a visible element.
    async fn is_visible(&mut self, selector: &str) -> Result<bool>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Scroll the last element matching `selector` into the viewport.
    async fn scroll_into_view_last(&mut self, selector: &str) -> Result<()>;

    /// Fetch another document in the same session (a second tab) and return
    /// its content. The current document stays current.
    async fn peek(&mut self, url: &str) -> Result<String>;

    /// Tear the page down.
    async fn close(self) -> Result<()>;
}

/// Hands out fresh pages, one per listing URL.
pub trait SessionProvider {
    type Page: Page;

    async fn open(&self) -> Result<Self::Page>;
}

/// Settings shared by every session a provider opens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run the browser without a window. Static sessions ignore it.
    pub headless: bool,
    pub user_agent: String,
    /// Browser-exported cookie file for authenticated sessions.
    pub cookies: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookies: None,
        }
    }
}
