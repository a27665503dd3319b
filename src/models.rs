//! Data models for normalized insight records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Record`]: One article/insight as published on a firm's listing page
//! - [`Batch`]: The records extracted from a single rendering of a listing
//! - [`ResultSet`]: The deduplicated, date-ordered records of one source
//!
//! A record's `link` is its identity within a source. The first record seen for
//! a link wins; later copies (overlapping pages, re-rendered "show more" lists,
//! the same article filed under several categories) are dropped.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A single insight article.
///
/// Optional fields are `None` when the source does not publish them, which is
/// different from `Some("")` for a source that renders an empty element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    /// Absolute or site-relative URL of the article. Unique within a source.
    pub link: String,
    /// The article headline.
    pub title: String,
    /// Publication date, if the listing shows one that could be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Teaser or abstract text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content type or practice area label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Topic tags in the order the source lists them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Record {
    /// Minimal record with only the required fields set.
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            date: None,
            description: None,
            category: None,
            tags: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Records extracted from one page, scroll state, or API response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub records: Vec<Record>,
    /// An explicit "more results exist" flag when the response carries one.
    pub has_more: Option<bool>,
}

impl Batch {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            has_more: None,
        }
    }

    pub fn with_has_more(mut self, has_more: bool) -> Self {
        self.has_more = Some(has_more);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest date among the dated records, `None` if nothing is dated.
    pub fn oldest_date(&self) -> Option<NaiveDate> {
        self.records.iter().filter_map(|r| r.date).min()
    }
}

/// Accumulated, link-deduplicated records for one source.
///
/// Records keep their first-seen order until [`ResultSet::into_sorted`] is
/// called at the end of a fetch.
#[derive(Debug, Default)]
pub struct ResultSet {
    records: Vec<Record>,
    seen: HashSet<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch in, skipping links that are already present.
    ///
    /// Returns the number of records actually added.
    pub fn absorb(&mut self, batch: &Batch) -> usize {
        let before = self.records.len();
        for record in &batch.records {
            if self.seen.insert(record.link.clone()) {
                self.records.push(record.clone());
            }
        }
        self.records.len() - before
    }

    /// Append another result set, keeping first-seen records on link clashes.
    pub fn extend(&mut self, other: ResultSet) {
        for record in other.records {
            if self.seen.insert(record.link.clone()) {
                self.records.push(record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Finish accumulation: newest first, undated records last.
    pub fn into_sorted(self) -> Vec<Record> {
        sort_newest_first(self.records)
    }
}

/// Order records by date descending with undated records at the end.
///
/// The sort is stable, so equal dates keep their first-seen order. Link
/// duplicates are dropped here as well, keeping the first occurrence.
pub fn sort_newest_first(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .unique_by(|r| r.link.clone())
        .sorted_by(|a, b| match (a.date, b.date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .collect()
}
