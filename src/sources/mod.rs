//! Firm listing definitions.
//!
//! Each submodule describes one firm's insights listing: where it lives, how
//! it paginates, and how a card or JSON item maps onto a [`Record`]. Adding a
//! firm means adding one module and one line to [`registry`].
//!
//! # Supported Sources
//!
//! | Source | Module | Transport | Pagination |
//! |--------|--------|-----------|------------|
//! | BDO | [`bdo`] | Rendered page, 4 service URLs | Show more |
//! | Baker Tilly | [`baker_tilly`] | Rendered page | Infinite scroll |
//! | Cherry Bekaert | [`cbh`] | Rendered page | `?p=` page number |
//! | CohnReznick | [`cohn_reznick`] | Rendered page | Numbered page links |
//! | Grant Thornton | [`grant_thornton`] | Rendered page, 5 topic URLs | Show more (double click) |
//! | Marcum | [`marcum`] | Rendered page | Next link |
//! | Plante Moran | [`plante_moran`] | Rendered page | Show more |
//! | PragerMetis | [`prager_metis`] | Rendered page | `/page/{n}/`, 404 ends |
//! | CLA | [`cla_connect`] | JSON API | `pageNum`, `hasMoreResources` |
//! | EisnerAmper | [`eisner_ramper`] | JSON API | `page`, empty page ends |
//! | PwC Viewpoint | [`pwc`] | JSON API, 6 content-type URLs | `start` offset, `numFound` |
//! | RSM | [`rsm`] | JSON card list | Single response |
//! | Withum | [`withum`] | JSON API | `page`, empty array ends |
//!
//! [`Record`]: crate::models::Record

use chrono::NaiveDate;
use scraper::Html;
use std::time::Duration;

use crate::error::Result;
use crate::normalize::{RecordNormalizer, clean, parse_date};
use crate::pagination::Pagination;
use crate::session::http::parse_selector;

pub mod baker_tilly;
pub mod bdo;
pub mod cbh;
pub mod cla_connect;
pub mod cohn_reznick;
pub mod eisner_ramper;
pub mod grant_thornton;
pub mod marcum;
pub mod plante_moran;
pub mod prager_metis;
pub mod pwc;
pub mod rsm;
pub mod withum;

/// Where to find a publication date on an article's own page, for listings
/// whose cards carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailDate {
    pub selector: &'static str,
    pub formats: &'static [&'static str],
    /// Cards tried, counting back from the last one in the batch.
    pub lookback: usize,
}

impl DetailDate {
    /// The date in an article document, `None` when absent or unparseable.
    pub fn read(&self, raw: &str) -> Result<Option<NaiveDate>> {
        let selector = parse_selector(self.selector)?;
        let document = Html::parse_document(raw);
        Ok(document
            .select(&selector)
            .next()
            .map(|el| clean(&el.text().collect::<Vec<_>>().join(" ")))
            .and_then(|text| parse_date(&text, self.formats)))
    }
}

/// One firm's listing: URLs, pagination mechanics and field extraction.
pub struct Source {
    pub name: &'static str,
    /// Listing URLs, fetched one after another. Page-param sources give URL
    /// templates containing `{page}`.
    pub urls: Vec<String>,
    /// Container that must render before extraction. `None` for JSON sources.
    pub listing: Option<&'static str>,
    /// Overlay (cookie banner) dismissed once if visible.
    pub overlay: Option<&'static str>,
    pub pagination: Pagination,
    /// Overrides the run's settle delay for this source.
    pub settle: Option<Duration>,
    /// Article-page date lookup used by month windows when cards are undated.
    pub detail_date: Option<DetailDate>,
    pub normalizer: Box<dyn RecordNormalizer>,
}

impl Source {
    pub fn new(
        name: &'static str,
        urls: Vec<String>,
        pagination: Pagination,
        normalizer: Box<dyn RecordNormalizer>,
    ) -> Self {
        Self {
            name,
            urls,
            listing: None,
            overlay: None,
            pagination,
            settle: None,
            detail_date: None,
            normalizer,
        }
    }

    pub fn with_listing(mut self, selector: &'static str) -> Self {
        self.listing = Some(selector);
        self
    }

    pub fn with_overlay(mut self, selector: &'static str) -> Self {
        self.overlay = Some(selector);
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = Some(settle);
        self
    }

    pub fn with_detail_date(mut self, detail: DetailDate) -> Self {
        self.detail_date = Some(detail);
        self
    }

    /// Replace the listing URLs, e.g. to fetch a single category.
    pub fn with_urls(mut self, urls: Vec<String>) -> Self {
        self.urls = urls;
        self
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("urls", &self.urls)
            .field("listing", &self.listing)
            .field("pagination", &self.pagination)
            .field("detail_date", &self.detail_date)
            .finish()
    }
}

type Constructor = fn() -> Result<Source>;

/// Every known source by CLI name.
pub fn registry() -> Vec<(&'static str, Constructor)> {
    vec![
        (bdo::NAME, bdo::source as Constructor),
        (baker_tilly::NAME, baker_tilly::source),
        (cbh::NAME, cbh::source),
        (cohn_reznick::NAME, cohn_reznick::source),
        (grant_thornton::NAME, grant_thornton::source),
        (marcum::NAME, marcum::source),
        (plante_moran::NAME, plante_moran::source),
        (prager_metis::NAME, prager_metis::source),
        (cla_connect::NAME, cla_connect::source),
        (eisner_ramper::NAME, eisner_ramper::source),
        (pwc::NAME, pwc::source),
        (rsm::NAME, rsm::source),
        (withum::NAME, withum::source),
    ]
}

pub fn names() -> Vec<&'static str> {
    registry().into_iter().map(|(name, _)| name).collect()
}

/// Build the source registered under `name`.
pub fn by_name(name: &str) -> Option<Result<Source>> {
    registry()
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, build)| build())
}
