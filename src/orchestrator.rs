//! The fetch-and-paginate control loop.
//!
//! [`FetchOrchestrator::execute`] runs one source to completion. Each listing
//! URL gets its own session and its own pass through a small state machine:
//!
//! ```text
//! Init ──► Extracting ──► Deciding ──► Advancing ──► Extracting …
//!   │                        │             │
//!   └──────────────► Done ◄──┴─────────────┘
//! ```
//!
//! - **Init**: take a gate slot, open a session, navigate, dismiss any
//!   overlay, wait for the listing to render.
//! - **Extracting**: normalize the current content into a batch and fold it
//!   into the URL's result set (first-seen link wins).
//! - **Deciding**: ask the [`DateWindowPolicy`] whether this batch is enough.
//!   Month windows over undated cards may read a few article pages (through
//!   [`Page::peek`]) to find a date.
//! - **Advancing**: ask the [`PaginationDriver`] for more. Exhaustion always
//!   ends the URL.
//! - **Done**: close the session, release the slot.
//!
//! Render timeouts and non-success responses end the URL with what it has.
//! Other errors fail the source. URLs of a multi-URL source never see each
//! other's batches; their result sets are concatenated and sorted newest
//! first once every URL is done.

use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ScrapeError};
use crate::gate::ConcurrencyGate;
use crate::horizon::{DateWindowPolicy, FetchHorizon};
use crate::models::{Batch, Record, ResultSet};
use crate::pagination::{Advance, PaginationDriver};
use crate::session::{Page, SessionProvider};
use crate::sources::Source;
use crate::utils::truncate_for_log;

/// Fixed delay after each click or scroll.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);
/// How long a listing may take to render.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing knobs for a run.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub settle: Duration,
    pub wait_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
enum State {
    Init,
    Extracting,
    Deciding(Batch),
    Advancing(Batch),
    Done,
}

/// Drives sources through sessions from one provider.
#[derive(Debug)]
pub struct FetchOrchestrator<P> {
    provider: P,
    gate: ConcurrencyGate,
    settings: OrchestratorSettings,
    today: Option<NaiveDate>,
}

impl<P: SessionProvider> FetchOrchestrator<P> {
    pub fn new(provider: P, gate: ConcurrencyGate, settings: OrchestratorSettings) -> Self {
        Self {
            provider,
            gate,
            settings,
            today: None,
        }
    }

    /// Evaluate month windows against a fixed date instead of the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn policy(&self, horizon: &FetchHorizon) -> DateWindowPolicy {
        let policy = DateWindowPolicy::new(horizon.clone());
        match self.today {
            Some(today) => policy.with_today(today),
            None => policy,
        }
    }

    /// Fetch `source` up to `horizon`, newest records first.
    #[instrument(level = "info", skip_all, fields(source = source.name, %horizon))]
    pub async fn execute(&self, source: &Source, horizon: &FetchHorizon) -> Result<Vec<Record>> {
        let t0 = Instant::now();
        let mut combined = ResultSet::new();

        for url in &source.urls {
            let per_url = self.run_url(source, url, horizon).await?;
            debug!(%url, count = per_url.len(), "Listing URL finished");
            combined.extend(per_url);
        }

        let records = combined.into_sorted();
        info!(
            count = records.len(),
            urls = source.urls.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched source"
        );
        Ok(records)
    }

    /// One listing URL under its own gate slot and session.
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn run_url(&self, source: &Source, url: &str, horizon: &FetchHorizon) -> Result<ResultSet> {
        let _permit = self.gate.acquire().await;
        let mut page = self.provider.open().await?;

        let outcome = self.drive(source, url, horizon, &mut page).await;

        if let Err(e) = page.close().await {
            warn!(error = %e, "Failed to close session");
        }
        outcome
    }

    async fn drive(
        &self,
        source: &Source,
        url: &str,
        horizon: &FetchHorizon,
        page: &mut P::Page,
    ) -> Result<ResultSet> {
        let policy = self.policy(horizon);
        let settle = source.settle.unwrap_or(self.settings.settle);
        let mut driver = PaginationDriver::new(source.pagination.clone(), url, settle);
        let mut results = ResultSet::new();
        let mut batches = 0usize;
        let mut state = State::Init;

        loop {
            state = match state {
                State::Init => match self.prepare(source, &driver, page).await {
                    Ok(()) => State::Extracting,
                    Err(e) => recover(e, "listing did not load")?,
                },
                State::Extracting => {
                    let rendered = match batches {
                        0 => Ok(()),
                        _ => self.wait_for_listing(source, page).await,
                    };
                    match rendered {
                        Err(e) => recover(e, "listing did not render after paginating")?,
                        Ok(()) => {
                            let raw = page.content().await?;
                            let batch = source.normalizer.extract(&raw).inspect_err(|e| {
                                debug!(error = %e, body = %truncate_for_log(&raw, 300), "Extraction failed");
                            })?;
                            batches += 1;
                            let added = results.absorb(&batch);
                            debug!(batch = batches, extracted = batch.len(), added, "Extracted batch");
                            State::Deciding(batch)
                        }
                    }
                }
                State::Deciding(batch) => {
                    let oldest = self.oldest_date(source, &policy, &batch, page).await?;
                    if policy.should_stop_at(oldest, false) {
                        debug!(batch = batches, "Horizon satisfied");
                        State::Done
                    } else {
                        State::Advancing(batch)
                    }
                }
                State::Advancing(batch) => match driver.advance(page, &batch).await {
                    Ok(Advance::Moved) => State::Extracting,
                    Ok(Advance::Exhausted) => {
                        let satisfied = policy.should_stop(&batch, true);
                        debug!(batch = batches, satisfied, "Pagination exhausted");
                        State::Done
                    }
                    Err(e) => recover(e, "pagination failed")?,
                },
                State::Done => break,
            };
        }

        info!(batches, count = results.len(), "Listing done");
        Ok(results)
    }

    /// Oldest date of `batch`. When a month window meets undated cards and
    /// the source knows where articles print their date, the last few cards'
    /// article pages are read until one yields a date.
    async fn oldest_date(
        &self,
        source: &Source,
        policy: &DateWindowPolicy,
        batch: &Batch,
        page: &mut P::Page,
    ) -> Result<Option<NaiveDate>> {
        let found = batch.oldest_date();
        let Some(detail) = source.detail_date else {
            return Ok(found);
        };
        if found.is_some() || !policy.needs_dates() {
            return Ok(found);
        }

        for record in batch.records.iter().rev().take(detail.lookback) {
            match page.peek(&record.link).await {
                Ok(raw) => {
                    if let Some(date) = detail.read(&raw)? {
                        debug!(link = %record.link, %date, "Dated batch from article page");
                        return Ok(Some(date));
                    }
                }
                Err(e) if e.is_recoverable() => {
                    debug!(link = %record.link, error = %e, "Article page unavailable");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    async fn prepare(&self, source: &Source, driver: &PaginationDriver, page: &mut P::Page) -> Result<()> {
        page.goto(&driver.start_url()).await?;

        if let Some(overlay) = source.overlay {
            match page.is_visible(overlay).await {
                Ok(true) => {
                    if let Err(e) = page.click(overlay).await {
                        debug!(overlay, error = %e, "Could not dismiss overlay");
                    }
                }
                Ok(false) => {}
                Err(e) => debug!(overlay, error = %e, "Overlay check failed"),
            }
        }

        self.wait_for_listing(source, page).await
    }

    async fn wait_for_listing(&self, source: &Source, page: &mut P::Page) -> Result<()> {
        match source.listing {
            Some(selector) => page.wait_for(selector, self.settings.wait_timeout).await,
            None => Ok(()),
        }
    }
}

/// Map a recoverable error to `Done`; pass anything else through.
fn recover(e: ScrapeError, context: &'static str) -> Result<State> {
    if e.is_recoverable() {
        warn!(error = %e, context, "Stopping listing early with partial results");
        Ok(State::Done)
    } else {
        Err(e)
    }
}
