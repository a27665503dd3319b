//! Typed extraction for sources that expose a JSON API.
//!
//! Each source declares the response shape as serde structs and a plain
//! function from that shape to a [`Batch`]. Deserialization failures surface
//! as [`crate::error::ScrapeError::Json`].

use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

use super::RecordNormalizer;
use crate::error::Result;
use crate::models::Batch;

/// Converts one decoded response into a batch.
pub type Convert<T> = fn(T) -> Result<Batch>;

/// [`RecordNormalizer`] that decodes `T` and hands it to a converter.
pub struct JsonNormalizer<T> {
    convert: Convert<T>,
    _response: PhantomData<fn() -> T>,
}

impl<T> JsonNormalizer<T> {
    pub fn new(convert: Convert<T>) -> Self {
        Self {
            convert,
            _response: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> RecordNormalizer for JsonNormalizer<T> {
    fn extract(&self, raw: &str) -> Result<Batch> {
        let response: T = serde_json::from_str(raw)?;
        let batch = (self.convert)(response)?;
        debug!(count = batch.len(), has_more = ?batch.has_more, "Decoded JSON batch");
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::models::Record;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Page {
        items: Vec<String>,
        more: bool,
    }

    fn convert(page: Page) -> Result<Batch> {
        let records = page.items.into_iter().map(|link| Record::new(link, "t")).collect();
        Ok(Batch::new(records).with_has_more(page.more))
    }

    #[test]
    fn test_decodes_and_converts() {
        let normalizer = JsonNormalizer::new(convert);
        let batch = normalizer.extract(r#"{"items": ["/a", "/b"], "more": false}"#).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.has_more, Some(false));
    }

    #[test]
    fn test_malformed_body_is_json_error() {
        let normalizer = JsonNormalizer::new(convert);
        let err = normalizer.extract("<html>blocked</html>").unwrap_err();
        assert!(matches!(err, ScrapeError::Json(_)));
        assert!(!err.is_recoverable());
    }
}
