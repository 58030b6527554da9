//! Processed-item state
//!
//! Item numbers handled during the current cycle, persisted between runs
//! so a budget-limited run resumes where the previous one stopped. The
//! serialized form is the numbers joined by `|`.

use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const STATE_DELIMITER: &str = "|";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedItems {
    numbers: HashSet<u64>,
}

impl ProcessedItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_issue_processed(&self, number: u64) -> bool {
        self.numbers.contains(&number)
    }

    pub fn add_issue_to_processed(&mut self, number: u64) {
        self.numbers.insert(number);
    }

    /// Forget everything; a full cycle completed
    pub fn reset(&mut self) {
        self.numbers.clear();
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Numbers joined by `|`, ascending
    pub fn serialize(&self) -> String {
        let mut numbers: Vec<u64> = self.numbers.iter().copied().collect();
        numbers.sort_unstable();
        numbers
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(STATE_DELIMITER)
    }

    /// Tokens that are not numbers are dropped
    pub fn deserialize(serialized: &str) -> Self {
        let numbers = serialized
            .split(STATE_DELIMITER)
            .filter_map(|token| token.trim().parse::<u64>().ok())
            .collect();
        Self { numbers }
    }
}

/// Storage for the serialized state between runs
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn save(&self, serialized: &str) -> anyhow::Result<()>;

    /// Empty string when nothing is stored
    async fn restore(&self) -> anyhow::Result<String>;
}

/// State kept in a single file
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn save(&self, serialized: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serialized)
            .await
            .with_context(|| format!("Failed to write state file: {:?}", self.path))?;
        log::debug!("Saved state to {:?}", self.path);
        Ok(())
    }

    async fn restore(&self) -> anyhow::Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read state file: {:?}", self.path)),
        }
    }
}

/// State kept in memory; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    contents: String,
    saves: usize,
}

impl MemoryStateStore {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemorySlot {
                contents: contents.into(),
                saves: 0,
            })),
        }
    }

    pub fn contents(&self) -> String {
        self.slot().contents.clone()
    }

    /// How many times `save` was called
    pub fn saves(&self) -> usize {
        self.slot().saves
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn save(&self, serialized: &str) -> anyhow::Result<()> {
        let mut slot = self.slot();
        slot.contents = serialized.to_string();
        slot.saves += 1;
        Ok(())
    }

    async fn restore(&self) -> anyhow::Result<String> {
        Ok(self.contents())
    }
}
