//! Grant Thornton insight hubs, one per topic.
//!
//! Cards carry no publication date. Under a month window the article page of
//! one of the last three cards is fetched and its hero-banner date decides
//! whether to keep clicking "Show More".

use crate::error::Result;
use crate::normalize::{HtmlNormalizer, HtmlRules};
use crate::pagination::Pagination;
use crate::sources::{DetailDate, Source};

pub const NAME: &str = "grant_thornton";

const TOPICS: [&str; 5] = [
    "audit-committee",
    "dc-dispatch",
    "digital-transformation",
    "growth-insights",
    "work-place-evolution",
];

const RULES: HtmlRules = HtmlRules {
    category: Some("p.cmp-search__result-category"),
    skip_category: Some("SURVEY REPORT"),
    ..HtmlRules::new("div.coveo-card-layout.CoveoResult", "a", "h5.cmp-search__result-title")
};

const ARTICLE_DATE: DetailDate = DetailDate {
    selector: "time.cmp-hero-banner__article-date",
    formats: &["%B %d, %Y"],
    lookback: 3,
};

pub fn source() -> Result<Source> {
    let urls = TOPICS
        .iter()
        .map(|topic| format!("https://grantthornton.com/insights/{topic}"))
        .collect();
    Ok(Source::new(
        NAME,
        urls,
        Pagination::show_more("button.cmp-button", 2),
        Box::new(HtmlNormalizer::new(RULES)?),
    )
    .with_listing("div.coveo-card-layout.CoveoResult")
    .with_overlay("#onetrust-accept-btn-handler")
    .with_detail_date(ARTICLE_DATE))
}
