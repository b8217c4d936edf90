//! Small helpers shared by the command handlers.

use std::path::Path;

use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use serde::de::DeserializeOwned;
use tokio::fs;

/// Read and parse a JSON input file given on the command line.
pub async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Invalid JSON in {}", path.display()))
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Show text as-is, or a placeholder when it is missing.
pub fn or_unset(text: Option<&str>) -> &str {
    text.unwrap_or("(not set)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use novella_types::TocItem;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_json_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toc.json");

        let err = read_json_file::<Vec<TocItem>>(&path).await.unwrap_err();
        assert!(err.to_string().contains("toc.json"));

        fs::write(&path, r#"[{"title_jp":"一話","chapter_id":"1"}]"#)
            .await
            .unwrap();
        let toc: Vec<TocItem> = read_json_file(&path).await.unwrap();
        assert_eq!(toc, vec![TocItem::chapter("一話", "1")]);
    }
}
