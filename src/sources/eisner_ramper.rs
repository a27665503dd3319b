//! EisnerAmper insights listing API.
//!
//! Past the last page the API reports zero records per page; that answer
//! becomes an empty batch, which ends pagination.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{Batch, Record};
use crate::normalize::{DatePolicy, JsonNormalizer, absolutize, resolve_date};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "eisner_ramper";

const ORIGIN: &str = "https://www.eisneramper.com";
const API: &str = "https://www.eisneramper.com/InsightsListing/Load?pageId=35885&page={page}&loadAll=true";
const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"];

#[derive(Debug, Deserialize)]
struct Response {
    paging: Paging,
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paging {
    /// Sometimes a number, sometimes a numeric string.
    records_per_page: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: String,
    link: String,
    display_date: Option<String>,
}

fn count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn to_batch(response: Response) -> Result<Batch> {
    if count(&response.paging.records_per_page) == 0 {
        return Ok(Batch::default());
    }
    let records = response
        .items
        .into_iter()
        .map(|item| {
            Ok(Record {
                link: absolutize(ORIGIN, &item.link)?,
                title: item.title.trim().to_string(),
                date: resolve_date(item.display_date.as_deref(), DATE_FORMATS, DatePolicy::Coerce)?,
                description: None,
                category: None,
                tags: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Batch::new(records))
}

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec![API.to_string()],
        Pagination::page_param(1, 1),
        Box::new(JsonNormalizer::new(to_batch)),
    ))
}
