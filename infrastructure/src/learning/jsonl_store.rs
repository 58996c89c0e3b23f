//! Learning history persisted as JSON lines.
//!
//! Existing lines are loaded on open; new records are appended. Lines that
//! fail to parse are skipped with a warning so that a truncated write does
//! not lose the rest of the history.

use super::memory_store::MemoryLearningStore;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};
use warroom_application::{LearningStore, StoreError};
use warroom_domain::LearningRecord;

pub struct JsonlLearningStore {
    memory: MemoryLearningStore,
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlLearningStore {
    pub fn open(path: impl AsRef<Path>, capacity: usize, threshold: f64) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let existing = if path.exists() { load(path)? } else { Vec::new() };
        debug!("Loaded {} learning records from {}", existing.len(), path.display());

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            memory: MemoryLearningStore::new(capacity, threshold).with_records(existing),
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load(path: &Path) -> Result<Vec<LearningRecord>, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LearningRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping learning record {}:{}: {}", path.display(), index + 1, e),
        }
    }
    Ok(records)
}

impl LearningStore for JsonlLearningStore {
    fn record(&self, record: LearningRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(&record)?;
        {
            let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }
        self.memory.push(record);
        Ok(())
    }

    fn find(&self, task: &str) -> Option<LearningRecord> {
        self.memory.find(task)
    }

    fn len(&self) -> usize {
        self.memory.len()
    }
}
