//! Bundled storage clients: local filesystem and in-memory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use futures::io::{AsyncReadExt, AsyncWriteExt};
use tokio::fs;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

use crate::traits::StorageClient;
use crate::types::StorageObject;

/// Persists each object as `<root>/<location>/<name>.log`.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StorageClient for FileStorage {
    async fn save(&self, location: &str, object: StorageObject) -> anyhow::Result<()> {
        let dir = self.root.join(location);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.log", object.name));
        let file = fs::File::create(&path).await?;
        let mut writer = file.compat_write();
        let written = futures::io::copy(object.data, &mut writer).await?;
        writer.flush().await?;
        debug!("wrote {} byte(s) to {}", written, path.display());
        Ok(())
    }
}

/// Keeps objects in memory, keyed by location and name. Drains each stream
/// fully on save; contents stay available for inspection.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: &str, name: &str) -> Option<Vec<u8>> {
        self.locked()
            .get(&(location.to_string(), name.to_string()))
            .cloned()
    }

    /// Names stored under a location, sorted.
    pub fn names(&self, location: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .locked()
            .keys()
            .filter(|(loc, _)| loc == location)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.locked().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked().is_empty()
    }

    fn locked(&self) -> MutexGuard<'_, HashMap<(String, String), Vec<u8>>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn save(&self, location: &str, object: StorageObject) -> anyhow::Result<()> {
        let mut data = Vec::new();
        let mut stream = object.data;
        stream.read_to_end(&mut data).await?;
        self.locked()
            .insert((location.to_string(), object.name), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogStream;
    use futures::io::Cursor;

    fn object(name: &str, payload: &str) -> StorageObject {
        let data: LogStream = Box::pin(Cursor::new(payload.as_bytes().to_vec()));
        StorageObject {
            name: name.to_string(),
            data,
        }
    }

    #[tokio::test]
    async fn file_storage_writes_named_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage
            .save("debug", object("edge_gateway-0_web", "line one\nline two\n"))
            .await
            .unwrap();

        let path = dir.path().join("debug").join("edge_gateway-0_web.log");
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "line one\nline two\n");
    }

    #[tokio::test]
    async fn file_storage_creates_nested_locations() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage
            .save("runs/2024-03-01", object("a_b_c", "x"))
            .await
            .unwrap();

        assert!(dir.path().join("runs/2024-03-01/a_b_c.log").exists());
    }

    #[tokio::test]
    async fn memory_storage_retains_drained_streams() {
        let storage = MemoryStorage::new();
        storage.save("debug", object("one", "alpha")).await.unwrap();
        storage.save("debug", object("two", "beta")).await.unwrap();
        storage.save("other", object("one", "gamma")).await.unwrap();

        assert_eq!(storage.len(), 3);
        assert_eq!(storage.get("debug", "one"), Some(b"alpha".to_vec()));
        assert_eq!(storage.names("debug"), vec!["one", "two"]);
        assert_eq!(storage.names("missing"), Vec::<String>::new());
    }
}
