//! Scripted in-memory sessions for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Result, ScrapeError};
use crate::session::{Page, SessionProvider};

/// Counts sessions that are open right now and the most ever open at once,
/// plus the interactions made through them.
#[derive(Debug, Default)]
pub struct SessionGauge {
    open: AtomicUsize,
    peak: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    navigations: AtomicUsize,
    clicks: AtomicUsize,
    peeks: AtomicUsize,
}

impl SessionGauge {
    fn enter(&self) {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn peeks(&self) -> usize {
        self.peeks.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Clicks and navigations move to the next page.
    Paged,
    /// Scrolling moves to the next (larger) snapshot.
    Scrolling,
}

/// A page that replays a fixed list of snapshots.
#[derive(Debug)]
pub struct ScriptedPage {
    mode: Mode,
    pages: Vec<String>,
    routes: HashMap<String, Vec<String>>,
    details: HashMap<String, String>,
    index: usize,
    reachable: usize,
    goto_failure: Option<(usize, u16)>,
    render_failure_at: Option<usize>,
    latency: Duration,
    gauge: Option<Arc<SessionGauge>>,
    pub clicks: Vec<String>,
    pub scrolls: usize,
    pub visited: Vec<String>,
    pub peeked: Vec<String>,
}

impl ScriptedPage {
    fn with_mode(mode: Mode, pages: Vec<String>) -> Self {
        let reachable = pages.len();
        Self {
            mode,
            pages,
            routes: HashMap::new(),
            details: HashMap::new(),
            index: 0,
            reachable,
            goto_failure: None,
            render_failure_at: None,
            latency: Duration::ZERO,
            gauge: None,
            clicks: Vec::new(),
            scrolls: 0,
            visited: Vec::new(),
            peeked: Vec::new(),
        }
    }

    /// One snapshot per page; clicks and later navigations move forward.
    pub fn paged(pages: Vec<String>) -> Self {
        Self::with_mode(Mode::Paged, pages)
    }

    /// Growing snapshots revealed one per scroll.
    pub fn scrolling(snapshots: Vec<String>) -> Self {
        Self::with_mode(Mode::Scrolling, snapshots)
    }

    /// Only the first `n` pages can be reached by clicking.
    pub fn reachable(mut self, n: usize) -> Self {
        self.reachable = n;
        self
    }

    /// Every navigation fails with `status`.
    pub fn failing_goto(self, status: u16) -> Self {
        self.failing_goto_after(0, status)
    }

    /// Navigations after the first `n` fail with `status`.
    pub fn failing_goto_after(mut self, n: usize, status: u16) -> Self {
        self.goto_failure = Some((n, status));
        self
    }

    /// Listing waits time out once page `index` is current.
    pub fn render_failure_at(mut self, index: usize) -> Self {
        self.render_failure_at = Some(index);
        self
    }

    /// Snapshots served when the first navigation goes to `url`.
    pub fn with_route(mut self, url: &str, pages: Vec<String>) -> Self {
        self.routes.insert(url.to_string(), pages);
        self
    }

    /// Document returned by [`Page::peek`] for `url`; other URLs answer 404.
    pub fn with_detail(mut self, url: &str, body: impl Into<String>) -> Self {
        self.details.insert(url.to_string(), body.into());
        self
    }

    fn count(&self, counter: impl Fn(&SessionGauge) -> &AtomicUsize) {
        if let Some(gauge) = &self.gauge {
            counter(gauge).fetch_add(1, Ordering::SeqCst);
        }
    }

    fn forward(&mut self) {
        self.index = (self.index + 1).min(self.pages.len().saturating_sub(1));
    }
}

impl Page for ScriptedPage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.count(|g| &g.navigations);
        if let Some((after, status)) = self.goto_failure {
            if self.visited.len() >= after {
                self.visited.push(url.to_string());
                return Err(ScrapeError::Transport {
                    url: url.to_string(),
                    status,
                });
            }
        }
        let first = self.visited.is_empty();
        self.visited.push(url.to_string());
        if first {
            if let Some(pages) = self.routes.get(url) {
                self.pages = pages.clone();
                self.reachable = self.pages.len();
            }
        } else {
            self.forward();
        }
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        match self.render_failure_at {
            Some(at) if self.index >= at => Err(ScrapeError::Render {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            _ => Ok(()),
        }
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.pages.get(self.index).cloned().unwrap_or_default())
    }

    async fn is_visible(&mut self, _selector: &str) -> Result<bool> {
        Ok(self.mode == Mode::Paged && self.index + 1 < self.reachable.min(self.pages.len()))
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        if !self.is_visible(selector).await? {
            return Err(ScrapeError::Render {
                selector: selector.to_string(),
                timeout_ms: 0,
            });
        }
        self.count(|g| &g.clicks);
        self.clicks.push(selector.to_string());
        self.forward();
        Ok(())
    }

    async fn scroll_into_view_last(&mut self, _selector: &str) -> Result<()> {
        self.scrolls += 1;
        if self.mode == Mode::Scrolling {
            self.forward();
        }
        Ok(())
    }

    async fn peek(&mut self, url: &str) -> Result<String> {
        self.count(|g| &g.peeks);
        self.peeked.push(url.to_string());
        self.details.get(url).cloned().ok_or_else(|| ScrapeError::Transport {
            url: url.to_string(),
            status: 404,
        })
    }

    async fn close(self) -> Result<()> {
        if let Some(gauge) = &self.gauge {
            gauge.leave();
        }
        Ok(())
    }
}

type PageFactory = Box<dyn Fn() -> ScriptedPage + Send + Sync>;

/// Hands out [`ScriptedPage`]s built by a factory and tracks open sessions.
pub struct ScriptedProvider {
    factory: PageFactory,
    routes: HashMap<String, Vec<String>>,
    latency: Duration,
    pub gauge: Arc<SessionGauge>,
}

impl ScriptedProvider {
    pub fn new(factory: impl Fn() -> ScriptedPage + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            routes: HashMap::new(),
            latency: Duration::ZERO,
            gauge: Arc::new(SessionGauge::default()),
        }
    }

    /// Pages whose snapshots depend on the first URL visited.
    pub fn routed(routes: Vec<(&str, Vec<String>)>) -> Self {
        let mut provider = Self::new(|| ScriptedPage::paged(Vec::new()));
        provider.routes = routes
            .into_iter()
            .map(|(url, pages)| (url.to_string(), pages))
            .collect();
        provider
    }

    /// Delay every navigation so concurrent runs overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl SessionProvider for ScriptedProvider {
    type Page = ScriptedPage;

    async fn open(&self) -> Result<ScriptedPage> {
        let mut page = (self.factory)();
        page.routes.extend(self.routes.clone());
        page.latency = self.latency;
        page.gauge = Some(Arc::clone(&self.gauge));
        self.gauge.enter();
        Ok(page)
    }
}
