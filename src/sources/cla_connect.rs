//! CLA (CliftonLarsonAllen) resources, read from the site's search API.
//!
//! The API answers `hasMoreResources`; a `false` ends pagination. Requests
//! are spaced five seconds apart, as the API throttles faster clients.

use serde::Deserialize;
use std::time::Duration;

use crate::error::Result;
use crate::models::{Batch, Record};
use crate::normalize::{DatePolicy, JsonNormalizer, absolutize, clean_opt, resolve_date};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "cla_connect";

const ORIGIN: &str = "https://www.claconnect.com";
const API: &str =
    "https://www.claconnect.com/webapi/ResourcesApi/ResourceLandingSearch/?pageNum={page}&loadAll=false&pageSize=20";

#[derive(Debug, Deserialize)]
struct Response {
    data: Data,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Data {
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    has_more_resources: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    url: String,
    title: String,
    abstract_text: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    date: Option<String>,
}

fn to_batch(response: Response) -> Result<Batch> {
    let records = response
        .data
        .resources
        .into_iter()
        .map(|r| {
            Ok(Record {
                link: absolutize(ORIGIN, &r.url)?,
                title: r.title.trim().to_string(),
                date: resolve_date(r.date.as_deref(), &["%m/%d/%Y"], DatePolicy::Strict)?,
                description: clean_opt(r.abstract_text.as_deref()),
                category: clean_opt(r.kind.as_deref()),
                tags: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Batch::new(records).with_has_more(response.data.has_more_resources))
}

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec![API.to_string()],
        Pagination::page_param(1, 1),
        Box::new(JsonNormalizer::new(to_batch)),
    )
    .with_settle(Duration::from_secs(5)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const BODY: &str = r#"{
        "data": {
            "resources": [
                {
                    "url": "/en/resources/articles/tax-reform-update",
                    "title": "Tax reform update ",
                    "abstractText": "What the bill means.",
                    "type": "Article",
                    "date": "05/06/2024",
                    "target": "_self",
                    "image": null
                },
                {
                    "url": "/en/resources/webinars/close",
                    "title": "Faster close",
                    "type": "Webinar",
                    "date": ""
                }
            ],
            "hasMoreResources": false
        }
    }"#;

    #[test]
    fn test_converts_resources() {
        let source = source().unwrap();
        assert_eq!(source.settle, Some(Duration::from_secs(5)));

        let batch = source.normalizer.extract(BODY).unwrap();
        assert_eq!(batch.has_more, Some(false));
        assert_eq!(batch.len(), 2);

        let first = &batch.records[0];
        assert_eq!(first.link, "https://www.claconnect.com/en/resources/articles/tax-reform-update");
        assert_eq!(first.title, "Tax reform update");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(first.description.as_deref(), Some("What the bill means."));
        assert_eq!(first.category.as_deref(), Some("Article"));
        assert_eq!(batch.records[1].date, None);
    }

    #[test]
    fn test_bad_date_fails() {
        let body = r#"{"data": {"resources": [{"url": "/x", "title": "X", "date": "2024-05-06"}]}}"#;
        assert!(source().unwrap().normalizer.extract(body).is_err());
    }
}
