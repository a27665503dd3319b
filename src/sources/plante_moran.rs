//! Plante Moran "Explore our thinking" search.

use crate::error::Result;
use crate::normalize::{DatePolicy, HtmlNormalizer, HtmlRules};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "plante_moran";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Dates mix `Jan. 5, 2024` and `March 5, 2024`; both become `Jan 5, 2024`.
fn abbreviate_month(raw: &str) -> String {
    let date = raw.replace('.', "");
    match MONTHS.iter().find(|month| date.contains(*month)) {
        Some(month) => date.replacen(month, &month[..3], 1),
        None => date,
    }
}

const RULES: HtmlRules = HtmlRules {
    date: Some("div.thought-item-details span.item.date"),
    description: Some("div.thought-item-details div.brief"),
    category: Some("div.thought-item-details span.item.type"),
    date_formats: &["%b %d, %Y"],
    date_policy: DatePolicy::Coerce,
    skip_unlinked: true,
    date_fixup: Some(abbreviate_month),
    ..HtmlRules::new(
        "ul.thought-items li.thought-item",
        "div.thought-item-details a",
        "div.thought-item-details a",
    )
};

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec!["https://www.plantemoran.com/explore-our-thinking/search?skip=0&keyword=".to_string()],
        Pagination::show_more("div.expand-icon.cta.cta--icon.cta--expand", 1),
        Box::new(HtmlNormalizer::new(RULES)?),
    )
    .with_listing("div.section.thought-list"))
}
