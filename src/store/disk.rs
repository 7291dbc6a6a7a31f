use super::{Generation, GenerationStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each generation as a JSON file inside a single directory.
///
/// Writes go to a sibling `*.tmp` file which is then renamed over the target,
/// so a reader or a restart never sees a truncated generation.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, generation: Generation) -> PathBuf {
        self.dir.join(generation.file_name())
    }
}

#[async_trait]
impl GenerationStore for DiskStore {
    async fn write(&self, generation: Generation, bytes: &[u8]) -> Result<()> {
        let target = self.path_for(generation);
        let tmp = target.with_extension("json.tmp");

        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &target)
            .await
            .with_context(|| format!("Failed to replace {}", target.display()))?;

        debug!(%generation, path = %target.display(), bytes = bytes.len(), "Generation written");
        Ok(())
    }

    async fn read(&self, generation: Generation) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(generation);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%generation, path = %path.display(), "No generation file on disk");
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn remove(&self, generation: Generation) -> Result<()> {
        let path = self.path_for(generation);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(%generation, path = %path.display(), "Generation removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
