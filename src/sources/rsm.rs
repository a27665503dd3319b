//! RSM US insights card list.
//!
//! The card-list component serves every insight in one JSON document, so there
//! is nothing to paginate. It is the only source whose records carry topic
//! tags.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{Batch, Record};
use crate::normalize::{DatePolicy, JsonNormalizer, absolutize, clean_opt, resolve_date};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "rsm";

const ORIGIN: &str = "https://rsmus.com";
const API: &str = "https://rsmus.com/insights/_jcr_content/root/container/container/container_copy/cardlist.list.json";
const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%m/%d/%Y", "%Y-%m-%d"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardList {
    #[serde(default)]
    original_results_list: Vec<Card>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Card {
    title: String,
    formatted_date: Option<String>,
    description: Option<String>,
    call_to_action_link: Link,
    #[serde(default)]
    displayable_tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Link {
    url: String,
}

#[derive(Debug, Deserialize)]
struct Tag {
    title: String,
}

fn to_batch(list: CardList) -> Result<Batch> {
    let records = list
        .original_results_list
        .into_iter()
        .map(|card| {
            Ok(Record {
                link: absolutize(ORIGIN, &card.call_to_action_link.url)?,
                title: card.title.trim().to_string(),
                date: resolve_date(card.formatted_date.as_deref(), DATE_FORMATS, DatePolicy::Coerce)?,
                description: clean_opt(card.description.as_deref()).filter(|d| !d.is_empty()),
                category: None,
                tags: Some(card.displayable_tags.into_iter().map(|t| t.title).collect()),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Batch::new(records).with_has_more(false))
}

pub fn source() -> Result<Source> {
    Ok(Source::new(
        NAME,
        vec![API.to_string()],
        Pagination::Single,
        Box::new(JsonNormalizer::new(to_batch)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const BODY: &str = r#"{
        "originalResultsList": [
            {
                "title": " Tariff update for manufacturers ",
                "formattedDate": "Apr 22, 2025",
                "description": "What the new duties mean.",
                "callToActionLink": {"url": "/insights/services/tax/tariff-update.html"},
                "displayableTags": [{"title": "Tax"}, {"title": "Manufacturing"}]
            },
            {
                "title": "Webinar replay",
                "formattedDate": null,
                "description": "",
                "callToActionLink": {"url": "https://rsmus.com/events/replay.html"}
            }
        ]
    }"#;

    #[test]
    fn test_converts_cards() {
        let batch = source().unwrap().normalizer.extract(BODY).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.has_more, Some(false));

        let first = &batch.records[0];
        assert_eq!(first.link, "https://rsmus.com/insights/services/tax/tariff-update.html");
        assert_eq!(first.title, "Tariff update for manufacturers");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 4, 22));
        assert_eq!(
            first.tags,
            Some(vec!["Tax".to_string(), "Manufacturing".to_string()])
        );

        let second = &batch.records[1];
        assert_eq!(second.link, "https://rsmus.com/events/replay.html");
        assert_eq!(second.date, None);
        assert_eq!(second.description, None);
        assert_eq!(second.tags, Some(vec![]));
    }

    #[test]
    fn test_is_single_response() {
        let source = source().unwrap();
        assert_eq!(source.pagination, Pagination::Single);
        assert_eq!(source.listing, None);
    }
}
