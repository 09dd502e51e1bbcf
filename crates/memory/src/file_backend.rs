//! File-based transcript: persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `Turn`. Turns are only ever appended, so
//! every `add` writes a single line instead of rewriting the file.
//!
//! Storage location: `~/.ponder/transcripts/transcript.jsonl` by default.

use async_trait::async_trait;
use ponder_core::error::MemoryError;
use ponder_core::message::Turn;
use ponder_core::transcript::TranscriptStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed transcript using JSONL (one turn per line).
///
/// Existing turns are loaded on creation, so a transcript can be resumed
/// across processes.
pub struct FileTranscript {
    path: PathBuf,
    turns: Arc<RwLock<Vec<Turn>>>,
}

impl FileTranscript {
    /// Open a transcript at the given path.
    ///
    /// If the file exists, turns are loaded from it.
    /// If the file does not exist, starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let turns = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = turns.len(), "File transcript loaded");
        Self {
            path,
            turns: Arc::new(RwLock::new(turns)),
        }
    }

    /// Default path: `~/.ponder/transcripts/transcript.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".ponder")
            .join("transcripts")
            .join("transcript.jsonl")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<Turn> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read transcript, starting empty");
                return Vec::new();
            }
        };

        let mut turns: Vec<Turn> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<Turn>(line) {
                Ok(turn) => Some(turn),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted transcript line");
                    None
                }
            })
            .collect();

        // Positions are dense after skipping corrupted lines.
        for (i, turn) in turns.iter_mut().enumerate() {
            turn.sequence = i as u64;
        }
        turns
    }

    fn append_line(&self, turn: &Turn) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create transcript directory: {e}"))
            })?;
        }

        let line = serde_json::to_string(turn)
            .map_err(|e| MemoryError::Serialization(format!("Failed to serialize turn: {e}")))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open transcript file: {e}")))?;

        writeln!(file, "{line}")
            .map_err(|e| MemoryError::Storage(format!("Failed to write transcript file: {e}")))
    }
}

#[async_trait]
impl TranscriptStore for FileTranscript {
    fn name(&self) -> &str {
        "file"
    }

    async fn add(&self, mut turn: Turn) -> Result<u64, MemoryError> {
        let mut turns = self.turns.write().await;
        let sequence = turns.len() as u64;
        turn.sequence = sequence;
        self.append_line(&turn)?;
        turns.push(turn);
        Ok(sequence)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Turn>, MemoryError> {
        let turns = self.turns.read().await;
        let start = turns.len().saturating_sub(limit);
        Ok(turns[start..].to_vec())
    }

    async fn all(&self) -> Result<Vec<Turn>, MemoryError> {
        Ok(self.turns.read().await.clone())
    }

    async fn len(&self) -> Result<usize, MemoryError> {
        Ok(self.turns.read().await.len())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        let mut turns = self.turns.write().await;
        if self.path.exists() {
            std::fs::write(&self.path, "").map_err(|e| {
                MemoryError::Storage(format!("Failed to truncate transcript file: {e}"))
            })?;
        }
        turns.clear();
        Ok(())
    }
}
