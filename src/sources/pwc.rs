//! PwC Viewpoint, one search per content type.
//!
//! The search API pages by result offset (`start`) in steps of 20 rows and
//! reports the total hit count, from which the batch's "has more" flag is
//! derived.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{Batch, Record};
use crate::normalize::{DatePolicy, JsonNormalizer, clean_opt, resolve_date};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "pwc";

const ROWS: u32 = 20;
const BASE: &str = "https://viewpoint.pwc.com/bin/pwc-madison/vp-search?locale=en_us&sp_k=us&_cookie=false";

/// Query strings for each content type, without paging parameters.
const SEARCHES: [&str; 6] = [
    "q=In%20brief&sort=pwcSortDate_dt%20desc&fq=pwcContentType_s%3A(%22In%20brief%22)&pwcSearchType=curated",
    "q=In%20depth&disp=Indepth&pwcSearchType=main",
    "q=In%20the%20loop&sort=pwcSortDate_dt%20desc&fq=pwcContentType_s%3A(%22In%20the%20loop%22)&pwcSearchType=curated",
    "q=News&sort=pwcSortDate_dt%20desc&fq=pwcContentType_s%3A(%22News%22)&pwcSearchType=curated",
    "q=PwC%20comment%20letter&sort=pwcSortDate_dt%20desc&fq=pwcContentType_s%3A(%22PwC%20comment%20letter%22)&fq=source_s%3A(%22PwC%22)&pwcSearchType=curated",
    "q=%22accounting%20weekly%20news%22&fq=pwcContentType_s%3A(%22Newsletter%22)&pwcSearchType=main",
];

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Response,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    num_found: u64,
    #[serde(default)]
    start: u64,
    #[serde(default)]
    docs: Vec<Doc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Doc {
    url: String,
    title: String,
    description: Option<String>,
    pwc_content_type: Option<String>,
    pwc_release_date: Option<String>,
}

fn to_batch(envelope: Envelope) -> Result<Batch> {
    let Response { num_found, start, docs } = envelope.response;
    let returned = docs.len() as u64;
    let records = docs
        .into_iter()
        .map(|doc| {
            Ok(Record {
                link: doc.url,
                title: doc.title.trim().to_string(),
                date: resolve_date(doc.pwc_release_date.as_deref(), &["%d %b %Y"], DatePolicy::Strict)?,
                description: clean_opt(doc.description.as_deref()),
                category: clean_opt(doc.pwc_content_type.as_deref()),
                tags: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Batch::new(records).with_has_more(start + returned < num_found))
}

pub fn source() -> Result<Source> {
    let urls = SEARCHES
        .iter()
        .map(|search| format!("{BASE}&{search}&start={{page}}&rows={ROWS}"))
        .collect();
    Ok(Source::new(
        NAME,
        urls,
        Pagination::page_param(0, ROWS),
        Box::new(JsonNormalizer::new(to_batch)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn body(start: u64, num_found: u64) -> String {
        format!(
            r#"{{"response": {{"numFound": {num_found}, "start": {start}, "docs": [
                {{"pwcContentId": "ib-2025-03", "pwcContentType": "In brief", "pwcReleaseDate": "07 Mar 2025",
                  "description": "FASB issues ASU.", "title": "FASB update", "url": "https://viewpoint.pwc.com/dt/us/en/pwc/in_brief/2025/ib-2025-03.html"}},
                {{"pwcContentId": "ib-2025-02", "pwcContentType": "In brief", "pwcReleaseDate": "28 Feb 2025",
                  "title": "SEC update", "url": "https://viewpoint.pwc.com/dt/us/en/pwc/in_brief/2025/ib-2025-02.html"}}
            ]}}}}"#
        )
    }

    #[test]
    fn test_urls_are_offset_templates() {
        let source = source().unwrap();
        assert_eq!(source.urls.len(), 6);
        assert!(source.urls.iter().all(|u| u.contains("start={page}&rows=20")));
    }

    #[test]
    fn test_converts_docs_and_has_more() {
        let source = source().unwrap();
        let batch = source.normalizer.extract(&body(0, 45)).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.has_more, Some(true));
        assert_eq!(batch.records[0].date, NaiveDate::from_ymd_opt(2025, 3, 7));
        assert_eq!(batch.records[0].category.as_deref(), Some("In brief"));
        assert_eq!(batch.records[1].description, None);

        let last = source.normalizer.extract(&body(43, 45)).unwrap();
        assert_eq!(last.has_more, Some(false));
    }
}
