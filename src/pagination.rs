//! Advancing a listing to its next batch of content.
//!
//! Five mechanics cover every source:
//!
//! | Variant | Step | Exhausted when |
//! |---------|------|----------------|
//! | [`Pagination::ClickNext`] | click the next-page control, settle | control absent |
//! | [`Pagination::ShowMore`] | click "show more" once or twice, settle | control absent |
//! | [`Pagination::InfiniteScroll`] | scroll last card into view, settle | content unchanged |
//! | [`Pagination::PageParam`] | request the next page/offset URL | no "has more", empty batch, non-success status |
//! | [`Pagination::Single`] | none | always |
//!
//! A [`PaginationDriver`] remembers when it ran dry. Calling
//! [`PaginationDriver::advance`] again afterwards answers
//! [`Advance::Exhausted`] without touching the page.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::models::Batch;
use crate::session::Page;

/// Placeholder substituted with a page number or offset.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// How a source reaches its next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    /// Click a next-page control. `{page}` in the selector becomes the number
    /// of the page being requested (2 for the first click).
    ClickNext { selector: String },
    /// Click an expand control `clicks` times per step.
    ShowMore { selector: String, clicks: u8 },
    /// Scroll the last `item` element into view.
    InfiniteScroll { item: String },
    /// The listing URL is a template; `{page}` runs `first, first+step, …`.
    PageParam { first: u32, step: u32 },
    /// One response holds the whole listing.
    Single,
}

impl Pagination {
    pub fn click_next(selector: impl Into<String>) -> Self {
        Pagination::ClickNext {
            selector: selector.into(),
        }
    }

    pub fn show_more(selector: impl Into<String>, clicks: u8) -> Self {
        Pagination::ShowMore {
            selector: selector.into(),
            clicks,
        }
    }

    pub fn infinite_scroll(item: impl Into<String>) -> Self {
        Pagination::InfiniteScroll { item: item.into() }
    }

    pub fn page_param(first: u32, step: u32) -> Self {
        Pagination::PageParam { first, step }
    }
}

/// Outcome of one pagination step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// New content is loaded and ready to extract.
    Moved,
    /// Nothing further to load.
    Exhausted,
}

/// Per-URL pagination state.
#[derive(Debug)]
pub struct PaginationDriver {
    kind: Pagination,
    url: String,
    settle: Duration,
    /// Current page number (click-next) or page/offset value (page-param).
    position: u32,
    snapshot: Option<String>,
    exhausted: bool,
}

impl PaginationDriver {
    /// `url` is the listing URL as the source declares it (a template for
    /// [`Pagination::PageParam`]).
    pub fn new(kind: Pagination, url: impl Into<String>, settle: Duration) -> Self {
        let position = match &kind {
            Pagination::PageParam { first, .. } => *first,
            _ => 1,
        };
        Self {
            kind,
            url: url.into(),
            settle,
            position,
            snapshot: None,
            exhausted: false,
        }
    }

    /// Where the session should navigate first.
    pub fn start_url(&self) -> String {
        match self.kind {
            Pagination::PageParam { first, .. } => render(&self.url, first),
            _ => self.url.clone(),
        }
    }

    fn exhaust(&mut self, reason: &'static str) -> Advance {
        debug!(reason, position = self.position, "Pagination exhausted");
        self.exhausted = true;
        Advance::Exhausted
    }

    /// Load the next batch into `page`.
    ///
    /// `last` is the batch just extracted; page-param listings use it to see
    /// whether the response announced more results. Errors from the page are
    /// returned as-is after the driver marks itself exhausted.
    #[instrument(level = "debug", skip_all, fields(url = %self.url, position = self.position))]
    pub async fn advance<P: Page>(&mut self, page: &mut P, last: &Batch) -> Result<Advance> {
        if self.exhausted {
            return Ok(Advance::Exhausted);
        }
        let step = self.step(page, last).await;
        if step.is_err() {
            self.exhausted = true;
        }
        step
    }

    async fn step<P: Page>(&mut self, page: &mut P, last: &Batch) -> Result<Advance> {
        match self.kind.clone() {
            Pagination::ClickNext { selector } => {
                let target = render(&selector, self.position + 1);
                if !page.is_visible(&target).await? {
                    return Ok(self.exhaust("next control not visible"));
                }
                page.click(&target).await?;
                self.position += 1;
                sleep(self.settle).await;
                Ok(Advance::Moved)
            }
            Pagination::ShowMore { selector, clicks } => {
                let mut landed = 0u8;
                for _ in 0..clicks.max(1) {
                    if !page.is_visible(&selector).await? {
                        break;
                    }
                    page.click(&selector).await?;
                    landed += 1;
                    sleep(self.settle).await;
                }
                // A partial step still loaded cards; the next call finds the
                // control gone and reports exhaustion.
                if landed == 0 {
                    return Ok(self.exhaust("show-more control not visible"));
                }
                self.position += 1;
                Ok(Advance::Moved)
            }
            Pagination::InfiniteScroll { item } => {
                let before = match self.snapshot.take() {
                    Some(s) => s,
                    None => page.content().await?,
                };
                page.scroll_into_view_last(&item).await?;
                sleep(self.settle).await;
                let after = page.content().await?;
                if after == before {
                    return Ok(self.exhaust("scroll produced no new content"));
                }
                self.snapshot = Some(after);
                self.position += 1;
                Ok(Advance::Moved)
            }
            Pagination::PageParam { step, .. } => {
                if last.has_more == Some(false) {
                    return Ok(self.exhaust("response reports no more results"));
                }
                if last.is_empty() {
                    return Ok(self.exhaust("empty result page"));
                }
                sleep(self.settle).await;
                self.position += step;
                page.goto(&render(&self.url, self.position)).await?;
                Ok(Advance::Moved)
            }
            Pagination::Single => Ok(self.exhaust("single-response listing")),
        }
    }
}

fn render(template: &str, n: u32) -> String {
    template.replace(PAGE_PLACEHOLDER, &n.to_string())
}
