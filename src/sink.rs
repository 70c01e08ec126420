use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Destination for run artifacts (screenshots, the JSON summary)
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `bytes` under `name` and return where they ended up
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf>;

    /// Short label for log lines
    fn sink_name(&self) -> &'static str;
}

/// Writes artifacts as plain files into one directory
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for FsSink {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("💾 Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    fn sink_name(&self) -> &'static str {
        "filesystem"
    }
}

/// Serialize `value` as pretty JSON and hand it to the sink
pub async fn save_json<T: Serialize + ?Sized>(
    sink: &dyn ArtifactSink,
    name: &str,
    value: &T,
) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)?;
    sink.save(name, json.as_bytes()).await
}
