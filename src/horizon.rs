//! Fetch horizons and the stop decision derived from them.
//!
//! A caller asks for `"first"`, `"all"`, or `"<N>m"` (a rolling window of N
//! coarse months). Any other text is kept as [`FetchHorizon::Unrecognized`]
//! and behaves exactly like `"first"`: one batch, no pagination. Existing
//! callers rely on that fallback.
//!
//! # Month arithmetic
//!
//! A month is 30 days. Pagination stops once
//! `floor(days_between(today, oldest_date) / 30) > N`, evaluated on the most
//! recent batch only. Sources whose listings are not strictly
//! reverse-chronological can therefore stop early or run long.

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::Batch;

static MONTH_WINDOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})m$").expect("month window pattern is valid"));

/// How far back a fetch should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchHorizon {
    /// Stop after the first batch.
    First,
    /// Continue until the pagination driver is exhausted.
    All,
    /// Continue until the oldest record of a batch is more than N months old.
    MonthWindow(u32),
    /// Anything else; treated as [`FetchHorizon::First`].
    Unrecognized(String),
}

impl FetchHorizon {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "first" => FetchHorizon::First,
            "all" => FetchHorizon::All,
            _ => MONTH_WINDOW
                .captures(trimmed)
                .and_then(|c| c[1].parse::<u32>().ok())
                .map(FetchHorizon::MonthWindow)
                .unwrap_or_else(|| FetchHorizon::Unrecognized(raw.to_string())),
        }
    }

    /// True when the stop decision depends on record dates.
    pub fn is_dated(&self) -> bool {
        matches!(self, FetchHorizon::MonthWindow(_))
    }
}

impl Default for FetchHorizon {
    fn default() -> Self {
        FetchHorizon::First
    }
}

impl FromStr for FetchHorizon {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FetchHorizon::parse(s))
    }
}

impl fmt::Display for FetchHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchHorizon::First => write!(f, "first"),
            FetchHorizon::All => write!(f, "all"),
            FetchHorizon::MonthWindow(n) => write!(f, "{n}m"),
            FetchHorizon::Unrecognized(raw) => write!(f, "{raw}"),
        }
    }
}

/// Whole 30-day months between `oldest` and `today`, floored.
pub fn months_elapsed(today: NaiveDate, oldest: NaiveDate) -> i64 {
    (today - oldest).num_days().div_euclid(30)
}

/// Decides after each batch whether accumulation should stop.
#[derive(Debug, Clone)]
pub struct DateWindowPolicy {
    horizon: FetchHorizon,
    today: Option<NaiveDate>,
}

impl DateWindowPolicy {
    pub fn new(horizon: FetchHorizon) -> Self {
        Self {
            horizon,
            today: None,
        }
    }

    /// Pin "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn needs_dates(&self) -> bool {
        self.horizon.is_dated()
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Evaluate the latest batch.
    ///
    /// `driver_exhausted` only matters for [`FetchHorizon::All`]; exhaustion
    /// ends every other horizon on its own.
    pub fn should_stop(&self, batch: &Batch, driver_exhausted: bool) -> bool {
        self.should_stop_at(batch.oldest_date(), driver_exhausted)
    }

    /// [`Self::should_stop`] for a batch whose oldest date was found some
    /// other way (an article page, for listings with undated cards).
    pub fn should_stop_at(&self, oldest: Option<NaiveDate>, driver_exhausted: bool) -> bool {
        match &self.horizon {
            FetchHorizon::First | FetchHorizon::Unrecognized(_) => true,
            FetchHorizon::All => driver_exhausted,
            FetchHorizon::MonthWindow(n) => match oldest {
                Some(oldest) => {
                    let elapsed = months_elapsed(self.today(), oldest);
                    debug!(%oldest, elapsed, window = n, "Month window check");
                    elapsed > i64::from(*n)
                }
                None => {
                    debug!("No dated records; cannot decide yet");
                    false
                }
            },
        }
    }
}
