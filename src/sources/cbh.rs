//! Cherry Bekaert insights, paged with a `?p=` query parameter.
//!
//! Past the last page the site renders a "no results" notice with no cards,
//! which extracts as an empty batch and ends pagination.

use crate::error::Result;
use crate::normalize::{DatePolicy, HtmlNormalizer, HtmlRules, TagSource};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "cbh";

const RULES: HtmlRules = HtmlRules {
    date: Some("div.insights-listing-block__date"),
    description: Some("div.insights-listing-block__description"),
    category: Some("div.insights-listing-block__category"),
    tags: Some(("div.insights-listing-block__badges a", TagSource::Href)),
    date_formats: &["%B %d, %Y"],
    date_policy: DatePolicy::Strict,
    ..HtmlRules::new(
        "div#SearchResults div.insights-listing-block__card",
        "div.insights-listing-block__title a",
        "div.insights-listing-block__title",
    )
};

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec!["https://www.cbh.com/insights/?p={page}#SearchResults".to_string()],
        Pagination::page_param(1, 1),
        Box::new(HtmlNormalizer::new(RULES)?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PAGE: &str = r#"
        <div id="SearchResults">
          <div class="insights-listing-block__card">
            <div class="insights-listing-block__category">Article</div>
            <div class="insights-listing-block__title"><a href="/insights/articles/r-and-d-credit">R&amp;D credit changes</a></div>
            <div class="insights-listing-block__date">January 15, 2025</div>
            <div class="insights-listing-block__description">Section 174 relief.</div>
            <div class="insights-listing-block__badges">
              <a href=" /industries/manufacturing ">Manufacturing</a>
              <a href="/services/tax">Tax</a>
            </div>
          </div>
          <div class="insights-listing-block__card">
            <div class="insights-listing-block__title"><a href="/insights/news/award">Award</a></div>
            <div class="insights-listing-block__date">December 2, 2024</div>
          </div>
        </div>"#;

    #[test]
    fn test_extracts_cards_with_badge_links() {
        let source = source().unwrap();
        let batch = source.normalizer.extract(PAGE).unwrap();
        assert_eq!(batch.len(), 2);

        let first = &batch.records[0];
        assert_eq!(first.link, "/insights/articles/r-and-d-credit");
        assert_eq!(first.title, "R&D credit changes");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(
            first.tags,
            Some(vec!["/industries/manufacturing".to_string(), "/services/tax".to_string()])
        );
        assert_eq!(batch.records[1].tags, Some(vec![]));
    }

    #[test]
    fn test_no_results_page_is_empty() {
        let source = source().unwrap();
        let page = r#"<div id="SearchResults"><p>No results found.</p></div>"#;
        assert!(source.normalizer.extract(page).unwrap().is_empty());
    }
}
