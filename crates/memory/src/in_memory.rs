//! In-memory transcript: the default store, and the one tests use.

use async_trait::async_trait;
use ponder_core::error::MemoryError;
use ponder_core::message::Turn;
use ponder_core::transcript::TranscriptStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A transcript that keeps turns in a Vec.
///
/// Cloning shares the underlying log, so a caller can keep one handle and
/// give the other to an agent, then inspect the turns after a run.
#[derive(Clone, Default)]
pub struct InMemoryTranscript {
    turns: Arc<RwLock<Vec<Turn>>>,
}

impl InMemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscript {
    fn name(&self) -> &str {
        "memory"
    }

    async fn add(&self, mut turn: Turn) -> Result<u64, MemoryError> {
        let mut turns = self.turns.write().await;
        let sequence = turns.len() as u64;
        turn.sequence = sequence;
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
        self.turns.write().await.clear();
        Ok(())
    }
}
