//! Turning rendered listings and JSON responses into [`Batch`]es.
//!
//! Every source supplies one [`RecordNormalizer`]. Normalizers are pure: they
//! see a snapshot of the current content and nothing else. Zero articles is a
//! valid answer (an empty batch), which several sources use to signal the end
//! of their pagination.
//!
//! # Date handling
//!
//! Each source declares a [`DatePolicy`]. Sources that tolerate garbage dates
//! use [`DatePolicy::Coerce`] and get `None`; the rest use
//! [`DatePolicy::Strict`], where an unparseable date fails the extraction.
//! A date element that is simply absent is `None` under both policies.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::models::Batch;

pub mod html;
pub mod json;

pub use html::{HtmlNormalizer, HtmlRules, TagSource, fragment_text};
pub use json::JsonNormalizer;

/// Produces one batch from one snapshot of content.
pub trait RecordNormalizer: Send + Sync {
    fn extract(&self, raw: &str) -> Result<Batch>;
}

/// What to do with a date string that matches none of the source's formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePolicy {
    /// Record it as missing and keep going.
    Coerce,
    /// Fail the extraction.
    Strict,
}

/// Collapse whitespace runs and trim. Empty input stays empty.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`clean`] for optional text; absent stays absent.
pub fn clean_opt(text: Option<&str>) -> Option<String> {
    text.map(clean)
}

/// Parse `raw` with the first matching format.
///
/// Formats with time fields are parsed as date-times and truncated to the
/// calendar date.
pub fn parse_date(raw: &str, formats: &[&str]) -> Option<NaiveDate> {
    let raw = raw.trim();
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(raw, fmt).ok().map(|dt| dt.date()))
    })
}

/// Apply a source's date policy to an optional raw value.
pub fn resolve_date(raw: Option<&str>, formats: &[&str], policy: DatePolicy) -> Result<Option<NaiveDate>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match (parse_date(raw, formats), policy) {
        (Some(date), _) => Ok(Some(date)),
        (None, DatePolicy::Coerce) => {
            warn!(value = %raw, "Unparseable date coerced to missing");
            Ok(None)
        }
        (None, DatePolicy::Strict) => Err(ScrapeError::parse("date", raw)),
    }
}

/// Resolve `path` against `origin`. Absolute URLs come back unchanged.
pub fn absolutize(origin: &str, path: &str) -> Result<String> {
    let base = Url::parse(origin).map_err(|e| ScrapeError::parse("origin", format!("{origin}: {e}")))?;
    base.join(path.trim())
        .map(String::from)
        .map_err(|e| ScrapeError::parse("link", format!("{path}: {e}")))
}
