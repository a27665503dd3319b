//! Marcum insights, paged with a "next" link.

use crate::error::Result;
use crate::normalize::{DatePolicy, HtmlNormalizer, HtmlRules};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "marcum";

const RULES: HtmlRules = HtmlRules {
    date: Some("div.card__meta"),
    date_formats: &["%B %d, %Y"],
    date_policy: DatePolicy::Strict,
    ..HtmlRules::new("article", "a", "h2.card__title")
};

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec!["https://www.marcumllp.com/insights".to_string()],
        Pagination::click_next("a.pag-button.pag-next"),
        Box::new(HtmlNormalizer::new(RULES)?),
    )
    .with_listing("div.page-body__right.page-body__right--wide"))
}
