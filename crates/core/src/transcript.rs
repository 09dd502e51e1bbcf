//! Transcript trait: the append-only history a run writes into.
//!
//! The loop controller only ever appends turns and reads back the most
//! recent window. Stores may outlive a single run; the caller decides.

use async_trait::async_trait;

use crate::error::MemoryError;
use crate::message::Turn;

/// The core TranscriptStore trait.
///
/// Implementations: in-memory (default), JSON-lines file.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// The backend name (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Append a turn, stamping its sequence position.
    ///
    /// Returns the assigned position.
    async fn add(&self, turn: Turn) -> Result<u64, MemoryError>;

    /// The last `limit` turns, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<Turn>, MemoryError>;

    /// Every turn, oldest first.
    async fn all(&self) -> Result<Vec<Turn>, MemoryError>;

    /// Total number of turns.
    async fn len(&self) -> Result<usize, MemoryError>;

    /// Drop all turns.
    async fn clear(&self) -> Result<(), MemoryError>;
}
