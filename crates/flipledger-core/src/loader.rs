//! Record loading from a data directory
//!
//! The collaborator exports `items.json` and `expenses.json` (JSON arrays)
//! into one directory. A missing or broken file degrades to an empty
//! collection plus an entry in the [`LoadReport`].

use flipledger_types::{Expense, InventoryItem};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{CoreError, LoadError, LoadReport};

pub const ITEMS_FILE: &str = "items.json";
pub const EXPENSES_FILE: &str = "expenses.json";

/// Item and expense collections that belong together
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub items: Vec<Arc<InventoryItem>>,
    pub expenses: Vec<Expense>,
}

/// JSON record reader with retry on parse failure
pub struct RecordLoader {
    /// Maximum retry attempts
    max_retries: u32,
    /// Delay between retries
    retry_delay: Duration,
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl RecordLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub async fn load_items(&self, path: &Path) -> Result<Vec<InventoryItem>, CoreError> {
        self.parse(path).await
    }

    pub async fn load_expenses(&self, path: &Path) -> Result<Vec<Expense>, CoreError> {
        self.parse(path).await
    }

    /// Parse a JSON file, retrying parse failures since an export may be mid-write
    async fn parse<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CoreError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, path = %path.display(), "Retrying record parse after delay");
                sleep(self.retry_delay).await;
            }

            match Self::try_parse(path).await {
                Ok(records) => return Ok(records),
                Err(e @ CoreError::JsonParse { .. }) => {
                    warn!(attempt, error = %e, "Record parse attempt failed");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::FileNotFound {
            path: path.to_path_buf(),
        }))
    }

    async fn try_parse<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::from_read(path, e))?;

        serde_json::from_str(&content).map_err(|e| CoreError::JsonParse {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: e,
        })
    }

    /// Load both collections from `dir`, recording problems in the report
    pub async fn load_dir(&self, dir: &Path) -> (RecordSet, LoadReport) {
        let mut report = LoadReport::new();
        let mut records = RecordSet::default();

        if !dir.is_dir() {
            let error = CoreError::DirectoryNotFound {
                path: dir.to_path_buf(),
            };
            report.add_error(LoadError {
                severity: crate::error::ErrorSeverity::Fatal,
                ..LoadError::from_core_error("data", &error)
            });
            return (records, report);
        }

        match self.load_items(&dir.join(ITEMS_FILE)).await {
            Ok(items) => {
                let undated = items.iter().filter(|i| i.purchased_on().is_err()).count();
                if undated > 0 {
                    report.records_with_bad_dates += undated;
                    report.add_warning(
                        "items",
                        format!("{} items with malformed purchase dates", undated),
                    );
                }
                report.items_loaded = items.len();
                records.items = items.into_iter().map(Arc::new).collect();
            }
            Err(e) => report.add_error(Self::degrade("items", &e)),
        }

        match self.load_expenses(&dir.join(EXPENSES_FILE)).await {
            Ok(expenses) => {
                let undated = expenses.iter().filter(|e| e.spent_on().is_err()).count();
                if undated > 0 {
                    report.records_with_bad_dates += undated;
                    report.add_warning(
                        "expenses",
                        format!("{} expenses with malformed dates", undated),
                    );
                }
                report.expenses_loaded = expenses.len();
                records.expenses = expenses;
            }
            Err(e) => report.add_error(Self::degrade("expenses", &e)),
        }

        info!(
            items = report.items_loaded,
            expenses = report.expenses_loaded,
            bad_dates = report.records_with_bad_dates,
            "Records loaded"
        );
        (records, report)
    }

    /// Missing files are warnings; anything else is an error
    fn degrade(source: &str, error: &CoreError) -> LoadError {
        let load_error = LoadError::from_core_error(source, error);
        match error {
            CoreError::FileNotFound { .. } => LoadError {
                severity: crate::error::ErrorSeverity::Warning,
                ..load_error
            },
            _ => load_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorSeverity;
    use flipledger_types::ItemStatus;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            ITEMS_FILE,
            r#"[
                {"id": "a", "name": "Lamp", "purchaseDate": "2024-03-01", "purchasePrice": 4.5,
                 "soldDate": "2024-03-09", "salePrice": 30, "profit": 25.5, "status": "sold",
                 "purchaseLocation": "Goodwill"},
                {"id": "b", "purchaseDate": "03/02/2024", "purchasePrice": 2}
            ]"#,
        );
        write(
            &dir,
            EXPENSES_FILE,
            r#"[{"id": "gas", "date": "2024-03-01", "amount": 12.0, "category": "travel"}]"#,
        );

        let (records, report) = RecordLoader::new().load_dir(dir.path()).await;

        assert!(!report.has_errors());
        assert_eq!(report.items_loaded, 2);
        assert_eq!(report.expenses_loaded, 1);
        assert_eq!(records.items[0].status, ItemStatus::Sold);
        assert_eq!(records.items[1].status, ItemStatus::Active);
        assert_eq!(records.expenses[0].amount, 12.0);
    }

    #[tokio::test]
    async fn test_missing_files_are_warnings() {
        let dir = TempDir::new().unwrap();
        let (records, report) = RecordLoader::new().load_dir(dir.path()).await;

        assert!(records.items.is_empty());
        assert!(records.expenses.is_empty());
        assert_eq!(report.error_count(), (2, 0, 0));
        assert!(!report.has_fatal_errors());
    }

    #[tokio::test]
    async fn test_missing_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (_, report) = RecordLoader::new()
            .load_dir(&dir.path().join("absent"))
            .await;

        assert!(report.has_fatal_errors());
        assert!(report.errors[0].suggestion.is_some());
    }

    #[tokio::test]
    async fn test_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, ITEMS_FILE, "[{\"id\": ");
        write(&dir, EXPENSES_FILE, "[]");

        let loader = RecordLoader::new().with_retries(1, Duration::from_millis(1));
        let (records, report) = loader.load_dir(dir.path()).await;

        assert!(records.items.is_empty());
        assert_eq!(report.error_count(), (0, 1, 0));
        assert_eq!(report.errors[0].severity, ErrorSeverity::Error);
    }

    #[tokio::test]
    async fn test_counts_malformed_dates() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            ITEMS_FILE,
            r#"[{"id": "a", "purchaseDate": "someday", "purchasePrice": 1}]"#,
        );
        write(&dir, EXPENSES_FILE, "[]");

        let (records, report) = RecordLoader::new().load_dir(dir.path()).await;

        assert_eq!(records.items.len(), 1);
        assert_eq!(report.records_with_bad_dates, 1);
        assert_eq!(report.warnings().count(), 1);
    }
}
