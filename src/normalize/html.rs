//! Selector-driven extraction for rendered listing pages.
//!
//! Most firm listings are a repeating card with a link, a headline and a few
//! labelled spans. [`HtmlRules`] captures that as plain data: one selector for
//! the card, one per field (evaluated inside the card), the date formats and
//! the date policy. Quirks that are not expressible as selectors (a prefix
//! glued to the date, cards to skip) go in the small hook fields.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{DatePolicy, RecordNormalizer, clean, resolve_date};
use crate::error::{Result, ScrapeError};
use crate::models::{Batch, Record};
use crate::session::http::parse_selector;

/// Where a tag's text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    Text,
    Href,
}

/// Field map for one listing layout.
#[derive(Debug, Clone)]
pub struct HtmlRules {
    /// Repeating article element.
    pub card: &'static str,
    /// Element carrying the article `href`.
    pub link: &'static str,
    pub title: &'static str,
    pub date: Option<&'static str>,
    pub description: Option<&'static str>,
    pub category: Option<&'static str>,
    pub tags: Option<(&'static str, TagSource)>,
    pub date_formats: &'static [&'static str],
    pub date_policy: DatePolicy,
    /// Rewrites the cleaned date text before parsing.
    pub date_fixup: Option<fn(&str) -> String>,
    /// Cards whose category equals this label are left out.
    pub skip_category: Option<&'static str>,
    /// Leave out cards without a link instead of failing the extraction.
    pub skip_unlinked: bool,
}

impl HtmlRules {
    /// Rules with only the required selectors; everything else absent.
    pub const fn new(card: &'static str, link: &'static str, title: &'static str) -> Self {
        Self {
            card,
            link,
            title,
            date: None,
            description: None,
            category: None,
            tags: None,
            date_formats: &[],
            date_policy: DatePolicy::Strict,
            date_fixup: None,
            skip_category: None,
            skip_unlinked: false,
        }
    }
}

struct Compiled {
    card: Selector,
    link: Selector,
    title: Selector,
    date: Option<Selector>,
    description: Option<Selector>,
    category: Option<Selector>,
    tags: Option<(Selector, TagSource)>,
}

/// [`RecordNormalizer`] driven by [`HtmlRules`].
pub struct HtmlNormalizer {
    rules: HtmlRules,
    compiled: Compiled,
}

impl std::fmt::Debug for HtmlNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlNormalizer").field("rules", &self.rules).finish()
    }
}

fn optional(selector: Option<&str>) -> Result<Option<Selector>> {
    selector.map(parse_selector).transpose()
}

impl HtmlNormalizer {
    /// Compile the rules' selectors. Fails on a malformed selector.
    pub fn new(rules: HtmlRules) -> Result<Self> {
        let compiled = Compiled {
            card: parse_selector(rules.card)?,
            link: parse_selector(rules.link)?,
            title: parse_selector(rules.title)?,
            date: optional(rules.date)?,
            description: optional(rules.description)?,
            category: optional(rules.category)?,
            tags: rules
                .tags
                .map(|(sel, source)| parse_selector(sel).map(|s| (s, source)))
                .transpose()?,
        };
        Ok(Self { rules, compiled })
    }

    fn card_record(&self, card: ElementRef<'_>) -> Result<Option<Record>> {
        let c = &self.compiled;
        let link = card
            .select(&c.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string());

        let Some(link) = link else {
            if self.rules.skip_unlinked {
                warn!(card = self.rules.card, "Card without link skipped");
                return Ok(None);
            }
            return Err(ScrapeError::parse("link", clean(&element_text(card))));
        };

        let category = first_text(card, c.category.as_ref());
        if let (Some(skip), Some(found)) = (self.rules.skip_category, category.as_deref()) {
            if found == skip {
                debug!(%link, category = found, "Skipping card by category");
                return Ok(None);
            }
        }

        let raw_date = first_text(card, c.date.as_ref()).map(|d| match self.rules.date_fixup {
            Some(fix) => fix(&d),
            None => d,
        });
        let date = resolve_date(raw_date.as_deref(), self.rules.date_formats, self.rules.date_policy)?;

        let tags = c.tags.as_ref().map(|(selector, source)| {
            card.select(selector)
                .filter_map(|el| match source {
                    TagSource::Text => Some(clean(&element_text(el))),
                    TagSource::Href => el.value().attr("href").map(|h| h.trim().to_string()),
                })
                .collect::<Vec<_>>()
        });

        Ok(Some(Record {
            link,
            title: first_text(card, Some(&c.title)).unwrap_or_default(),
            date,
            description: first_text(card, c.description.as_ref()),
            category,
            tags,
        }))
    }
}

impl RecordNormalizer for HtmlNormalizer {
    fn extract(&self, raw: &str) -> Result<Batch> {
        let document = Html::parse_document(raw);
        let mut records = Vec::new();
        for card in document.select(&self.compiled.card) {
            if let Some(record) = self.card_record(card)? {
                records.push(record);
            }
        }
        debug!(count = records.len(), card = self.rules.card, "Extracted cards");
        Ok(Batch::new(records))
    }
}

/// Visible text of an HTML fragment, entities decoded and whitespace cleaned.
pub fn fragment_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    clean(&element_text(fragment.root_element()))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn first_text(card: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let selector = selector?;
    card.select(selector).next().map(|el| clean(&element_text(el)))
}
