//! Audit records for submitted EXPLAIN text.

use crate::utils::error::StoreError;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// One submitted plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub explain_output: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PlanRecord {
    pub fn new(
        explain_output: impl Into<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            explain_output: explain_output.into(),
            ip_address,
            user_agent,
            created_at: Utc::now(),
        }
    }
}

/// Sink for submitted plans
pub trait PlanStore: Send + Sync {
    /// Persist a record and return its id
    fn save_plan(&self, record: &PlanRecord) -> Result<u64, StoreError>;
}

/// Append-only JSON Lines audit log
///
/// Each record is one line; ids are 1-based line numbers. The existing file
/// is counted once, on the first save, and ids are handed out from memory
/// after that, so only one process should append to a given log.
#[derive(Debug)]
pub struct JsonlPlanStore {
    path: PathBuf,
    next_id: Mutex<Option<u64>>,
}

impl JsonlPlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_id: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, in insertion order
    pub fn load_all(&self) -> Result<Vec<PlanRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    fn count_records(&self) -> Result<u64, StoreError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut count = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }
}

impl PlanStore for JsonlPlanStore {
    fn save_plan(&self, record: &PlanRecord) -> Result<u64, StoreError> {
        let mut next_id = self.next_id.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let line = serde_json::to_string(record)?;
        let id = match *next_id {
            Some(id) => id,
            None => self.count_records()? + 1,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        *next_id = Some(id + 1);

        debug!("Saved plan record {} to {}", id, self.path.display());
        Ok(id)
    }
}

/// Save `record` on a background thread
///
/// The returned handle may be joined or dropped; failures are only logged.
pub fn persist_in_background(store: Arc<dyn PlanStore>, record: PlanRecord) -> JoinHandle<()> {
    std::thread::spawn(move || match store.save_plan(&record) {
        Ok(id) => debug!("Plan recorded with id {}", id),
        Err(e) => warn!("Error saving explain: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl PlanStore for FailingStore {
        fn save_plan(&self, _record: &PlanRecord) -> Result<u64, StoreError> {
            Err(StoreError::Io(std::io::Error::other("database down")))
        }
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlPlanStore::new(temp_dir.path().join("audit/plans.jsonl"));

        let first = PlanRecord::new("-> Limit", Some("127.0.0.1".to_string()), None);
        let second = PlanRecord::new("-> Sort", None, Some("curl/8.0".to_string()));

        assert_eq!(store.save_plan(&first).unwrap(), 1);
        assert_eq!(store.save_plan(&second).unwrap(), 2);

        let records = store.load_all().unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn test_reopened_store_continues_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plans.jsonl");

        let store = JsonlPlanStore::new(&path);
        assert_eq!(store.save_plan(&PlanRecord::new("-> Limit", None, None)).unwrap(), 1);
        assert_eq!(store.save_plan(&PlanRecord::new("-> Sort", None, None)).unwrap(), 2);

        let reopened = JsonlPlanStore::new(&path);
        assert_eq!(reopened.save_plan(&PlanRecord::new("-> Scan", None, None)).unwrap(), 3);
        assert_eq!(reopened.save_plan(&PlanRecord::new("-> Filter", None, None)).unwrap(), 4);
        assert_eq!(reopened.load_all().unwrap().len(), 4);
    }

    #[test]
    fn test_concurrent_saves_get_distinct_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonlPlanStore::new(temp_dir.path().join("plans.jsonl")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .save_plan(&PlanRecord::new(format!("-> Scan {}", i), None, None))
                        .unwrap()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();

        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
        assert_eq!(store.load_all().unwrap().len(), 8);
    }

    #[test]
    fn test_load_all_missing_file() {
        let store = JsonlPlanStore::new("/nonexistent/dir/plans.jsonl");
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_background_failure_is_absorbed() {
        let store: Arc<dyn PlanStore> = Arc::new(FailingStore);
        let handle = persist_in_background(store, PlanRecord::new("-> Limit", None, None));
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_background_save_writes_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plans.jsonl");
        let store = Arc::new(JsonlPlanStore::new(&path));

        persist_in_background(store.clone(), PlanRecord::new("-> Limit", None, None))
            .join()
            .unwrap();

        assert_eq!(store.load_all().unwrap().len(), 1);
    }
}
