use super::{Generation, GenerationStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Non-durable store, used when no data directory is available and in tests.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<Generation, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn write(&self, generation: Generation, bytes: &[u8]) -> Result<()> {
        self.files.lock().await.insert(generation, bytes.to_vec());
        debug!(%generation, "Generation stored in memory");
        Ok(())
    }

    async fn read(&self, generation: Generation) -> Result<Option<Vec<u8>>> {
        Ok(self.files.lock().await.get(&generation).cloned())
    }

    async fn remove(&self, generation: Generation) -> Result<()> {
        self.files.lock().await.remove(&generation);
        Ok(())
    }
}
