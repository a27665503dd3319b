//! CohnReznick insights, paged with numbered links.

use crate::error::Result;
use crate::normalize::{DatePolicy, HtmlNormalizer, HtmlRules, TagSource};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "cohn_reznick";

/// `PublishedDate : Monday, May 6, 2024 at 9:00 AM` → `Monday, May 6, 2024`.
fn published_date(raw: &str) -> String {
    let raw = raw.trim_start_matches("PublishedDate :").trim();
    raw.split(" at ").next().unwrap_or(raw).trim().to_string()
}

const RULES: HtmlRules = HtmlRules {
    date: Some("div.publishDate"),
    description: Some("div.sc-blHHSb.lhZsno"),
    tags: Some(("div.Type span", TagSource::Text)),
    date_formats: &["%A, %B %d, %Y"],
    date_policy: DatePolicy::Strict,
    date_fixup: Some(published_date),
    ..HtmlRules::new("div.searchArticlesListView > div", "a", "div.Title")
};

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec!["https://www.cohnreznick.com/insights".to_string()],
        Pagination::click_next("a[data-page=\"{page}\"]"),
        Box::new(HtmlNormalizer::new(RULES)?),
    )
    .with_listing("div.searchArticlesListView"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_published_date_fixup() {
        assert_eq!(
            published_date("PublishedDate : Monday, May 6, 2024 at 9:00 AM"),
            "Monday, May 6, 2024"
        );
        assert_eq!(published_date("Friday, March 1, 2024"), "Friday, March 1, 2024");
    }

    #[test]
    fn test_extracts_cards() {
        let page = r#"
            <div class="searchArticlesListView">
              <div>
                <a href="/insights/affordable-housing"><div class="Title">Affordable housing</div></a>
                <div class="publishDate">PublishedDate : Monday, May 6, 2024 at 9:00 AM</div>
                <div class="sc-blHHSb lhZsno">LIHTC trends.</div>
                <div class="Type"><span>Article</span><span> Real Estate </span></div>
              </div>
            </div>"#;
        let batch = source().unwrap().normalizer.extract(page).unwrap();
        let record = &batch.records[0];
        assert_eq!(record.link, "/insights/affordable-housing");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(record.description.as_deref(), Some("LIHTC trends."));
        assert_eq!(record.tags, Some(vec!["Article".to_string(), "Real Estate".to_string()]));
    }
}
