//! Baker Tilly insights. The listing grows as the last card scrolls into view.

use crate::error::Result;
use crate::normalize::{DatePolicy, HtmlNormalizer, HtmlRules};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "baker_tilly";

const CARD: &str = "div.position-relative.py-6.border-bottom.border-dark";

const RULES: HtmlRules = HtmlRules {
    date: Some("div.row div.col-md-7 > p:not([class])"),
    description: Some("p.line-clamp-3"),
    category: Some("p.kicker"),
    date_formats: &["%b %d, %Y"],
    date_policy: DatePolicy::Strict,
    ..HtmlRules::new(CARD, "a", "a")
};

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec!["https://www.bakertilly.com/insights".to_string()],
        Pagination::infinite_scroll(CARD),
        Box::new(HtmlNormalizer::new(RULES)?),
    )
    .with_listing("div.container-fluid"))
}
