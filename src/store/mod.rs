pub mod disk;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Display;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Named snapshots of pipeline output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// Filtered and deduplicated feed rows.
    Cleaned,
    /// Random permutation of [`Generation::Cleaned`].
    Shuffled,
    /// Annotated prefix of [`Generation::Shuffled`].
    Enriched,
}

impl Generation {
    pub fn file_name(&self) -> &'static str {
        match self {
            Generation::Cleaned => "nav-cleaned.json",
            Generation::Shuffled => "nav-shuffled.json",
            Generation::Enriched => "nav-final.json",
        }
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Generation::Cleaned => "cleaned",
            Generation::Shuffled => "shuffled",
            Generation::Enriched => "enriched",
        };
        f.write_str(name)
    }
}

/// Durable storage for serialized generations. Every write replaces the whole
/// generation.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn write(&self, generation: Generation, bytes: &[u8]) -> Result<()>;

    /// Returns `None` when the generation was never written.
    async fn read(&self, generation: Generation) -> Result<Option<Vec<u8>>>;

    /// Deletes a generation. Removing one that does not exist is not an error.
    async fn remove(&self, generation: Generation) -> Result<()>;
}
