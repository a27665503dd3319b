//! BDO USA insights, one listing per service line.

use crate::error::Result;
use crate::normalize::{DatePolicy, HtmlNormalizer, HtmlRules};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "bdo";

const SERVICES: [&str; 4] = ["assurance", "advisory_1", "digital", "tax_1"];

const RULES: HtmlRules = HtmlRules {
    date: Some("span.publish-date"),
    description: Some("p.description"),
    category: Some("span.tag"),
    date_formats: &["%B %d, %Y"],
    date_policy: DatePolicy::Coerce,
    skip_unlinked: true,
    ..HtmlRules::new("div.insight-card-wrapper", "a", "div.animated-content h3")
};

pub fn source() -> Result<Source> {
    let urls = SERVICES
        .iter()
        .map(|service| format!("https://www.bdo.com/insights?insightType=article&insightService={service}&"))
        .collect();
    Ok(Source::new(
        NAME,
        urls,
        Pagination::show_more("div.show-more-container > button", 1),
        Box::new(HtmlNormalizer::new(RULES)?),
    )
    .with_listing("div.card-grid"))
}
