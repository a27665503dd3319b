//! JSON output of fetched records.
//!
//! One file per source per run date:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── bdo.json
//!     ├── marcum.json
//!     └── pwc.json
//! ```
//!
//! Each file is a pretty-printed array of records, newest first. Dates are
//! `YYYY-MM-DD`; absent optional fields are omitted. A rerun on the same day
//! replaces the file.

use crate::models::Record;
use chrono::{Local, NaiveDate};
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write one source's records under today's date directory.
///
/// # Arguments
///
/// * `records` - The fetched records, already sorted
/// * `source` - Source name, used as the file stem
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
pub async fn write_result_set(
    records: &[Record],
    source: &str,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    write_result_set_on(records, source, json_output_dir, Local::now().date_naive()).await
}

/// [`write_result_set`] with an explicit run date.
#[instrument(level = "info", skip_all, fields(%source, json_output_dir = %json_output_dir, %date))]
pub async fn write_result_set_on(
    records: &[Record],
    source: &str,
    json_output_dir: &str,
    date: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    let full_json_dir = PathBuf::from(json_output_dir).join(date.to_string());
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = full_json_dir.join(format!("{source}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), count = records.len(), "Wrote JSON file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("insights-json-{name}-{}", std::process::id()))
    }

    #[tokio::test]
    async fn test_writes_dated_file() {
        let dir = scratch("dated");
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        let records = vec![
            Record::new("https://firm.test/b", "B").with_date(date),
            Record::new("https://firm.test/a", "A"),
        ];

        let path = write_result_set_on(&records, "marcum", &dir.to_string_lossy(), date)
            .await
            .unwrap();
        assert_eq!(path, dir.join("2025-05-06").join("marcum.json"));

        let written: Vec<Record> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, records);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"date\": \"2025-05-06\""));
        assert!(!raw.contains("description"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_empty_result_is_empty_array() {
        let dir = scratch("empty");
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let path = write_result_set_on(&[], "withum", &dir.to_string_lossy(), date)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
