//! PragerMetis featured insights.
//!
//! A WordPress archive: page `n` lives at `/page/n/`, and a page past the end
//! answers 404, which ends the listing. The date is the leading text of the
//! author block, followed by the byline.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::normalize::{DatePolicy, HtmlNormalizer, HtmlRules};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "prager_metis";

const ARCHIVE: &str = "https://pragermetis.com/insight_categories/featured-uk/page/{page}/";

static LEADING_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec) \d{1,2}, \d{4}")
        .expect("leading date pattern is valid")
});

/// Keep only the date at the start of the author block.
fn leading_date(raw: &str) -> String {
    LEADING_DATE
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}

const RULES: HtmlRules = HtmlRules {
    date: Some("div.author-block"),
    date_formats: &["%b %d, %Y"],
    date_policy: DatePolicy::Strict,
    date_fixup: Some(leading_date),
    ..HtmlRules::new(
        "div#posts-container article",
        "h2.entry-title.fusion-post-title a",
        "h2.entry-title.fusion-post-title",
    )
};

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec![ARCHIVE.to_string()],
        Pagination::page_param(1, 1),
        Box::new(HtmlNormalizer::new(RULES)?),
    )
    .with_listing("div#posts-container"))
}
