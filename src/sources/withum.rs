//! Withum resources from the site's WordPress REST API.
//!
//! Titles arrive as rendered HTML and dates come from the embedded featured
//! image. An empty array (or the 400 WordPress answers past the last page)
//! ends pagination.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Batch, Record};
use crate::normalize::{DatePolicy, JsonNormalizer, fragment_text, resolve_date};
use crate::pagination::Pagination;
use crate::sources::Source;

pub const NAME: &str = "withum";

const API: &str = "https://www.withum.com/wp-json/wp/v2/posts?_embed=true&page={page}&per_page=20&_fields=author,id,excerpt,title,link,featured_media,_links,_embedded,post_authors&tax_relation=AND&category_filter=71,63,84,73";

#[derive(Debug, Deserialize)]
struct Post {
    title: Rendered,
    link: String,
    #[serde(default)]
    excerpt: Option<Rendered>,
    #[serde(default, rename = "_embedded")]
    embedded: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Rendered {
    rendered: String,
}

#[derive(Debug, Deserialize)]
struct Media {
    date: Option<String>,
}

impl Post {
    fn media_date(&self) -> Option<String> {
        let media = self.embedded.get("wp:featuredmedia")?.get(0)?.clone();
        serde_json::from_value::<Media>(media).ok()?.date
    }
}

fn to_batch(posts: Vec<Post>) -> Result<Batch> {
    let records = posts
        .into_iter()
        .map(|post| {
            let date = resolve_date(post.media_date().as_deref(), &["%Y-%m-%dT%H:%M:%S"], DatePolicy::Strict)?;
            Ok(Record {
                title: fragment_text(&post.title.rendered),
                description: post
                    .excerpt
                    .map(|e| fragment_text(&e.rendered))
                    .filter(|e| !e.is_empty()),
                link: post.link,
                date,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use chrono::NaiveDate;

    #[test]
    fn test_converts_posts() {
        let body = r#"[
            {
                "id": 1,
                "title": {"rendered": "What&#8217;s next for SALT"},
                "link": "https://www.withum.com/resources/whats-next-for-salt/",
                "excerpt": {"rendered": "<p>State and local tax.</p>\n"},
                "_embedded": {"wp:featuredmedia": [{"id": 9, "date": "2024-10-01T08:30:00"}]}
            },
            {
                "id": 2,
                "title": {"rendered": "No image"},
                "link": "https://www.withum.com/resources/no-image/"
            }
        ]"#;
        let batch = source().unwrap().normalizer.extract(body).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].title, "What\u{2019}s next for SALT");
        assert_eq!(batch.records[0].date, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert_eq!(batch.records[0].description.as_deref(), Some("State and local tax."));
        assert_eq!(batch.records[1].date, None);
    }

    #[test]
    fn test_empty_array_is_empty_batch() {
        assert!(source().unwrap().normalizer.extract("[]").unwrap().is_empty());
    }

    #[test]
    fn test_wordpress_error_object_is_json_error() {
        let body = r#"{"code": "rest_post_invalid_page_number", "data": {"status": 400}}"#;
        let err = source().unwrap().normalizer.extract(body).unwrap_err();
        assert!(matches!(err, ScrapeError::Json(_)));
    }
}
