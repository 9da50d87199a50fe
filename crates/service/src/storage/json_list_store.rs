use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs,
    sync::{Mutex, RwLock},
};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed, insertion-ordered list.
///
/// Mutations only touch memory; call [`JsonListStore::persist`] to write the
/// whole list to disk. Reads clone out of a shared lock so they never wait on
/// file I/O.
pub struct JsonListStore<T> {
    inner: RwLock<Vec<T>>,
    file_path: PathBuf,
    // Held while snapshotting and writing so flushes land in order.
    flush_lock: Mutex<()>,
}

impl<T> JsonListStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open the store at `path`. A missing file is created holding `[]`;
    /// an existing file that does not parse is an error.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(storage_err)?;
        }

        let items: Vec<T> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("cannot parse {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&file_path, b"[]").await.map_err(storage_err)?;
                Vec::new()
            }
            Err(e) => return Err(storage_err(e)),
        };
        debug!(path = %file_path.display(), count = items.len(), "json list store opened");

        Ok(Self { inner: RwLock::new(items), file_path, flush_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clone of the whole list in insertion order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    pub async fn find<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool + Send,
    {
        self.inner.read().await.iter().find(|item| pred(item)).cloned()
    }

    pub async fn filter<P>(&self, pred: P) -> Vec<T>
    where
        P: Fn(&T) -> bool + Send,
    {
        self.inner.read().await.iter().filter(|item| pred(item)).cloned().collect()
    }

    pub async fn push(&self, item: T) {
        self.inner.write().await.push(item);
    }

    /// Apply `f` to the first item matching `pred`; returns the item after
    /// modification, `None` if nothing matched.
    pub async fn modify_first<P, F>(&self, pred: P, f: F) -> Option<T>
    where
        P: Fn(&T) -> bool + Send,
        F: FnOnce(&mut T) + Send,
    {
        let mut items = self.inner.write().await;
        let item = items.iter_mut().find(|item| pred(item))?;
        f(item);
        Some(item.clone())
    }

    /// Remove and return the first item matching `pred`.
    pub async fn remove_first<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool + Send,
    {
        let mut items = self.inner.write().await;
        let idx = items.iter().position(|item| pred(item))?;
        Some(items.remove(idx))
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Run `f` against the list under the write lock.
    pub async fn mutate<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError> + Send,
    {
        let mut items = self.inner.write().await;
        f(&mut items)
    }

    /// Write the current list to the backing file and return how many items
    /// were written. Goes through a sibling temp file and a rename so a crash
    /// mid-write leaves the previous contents intact.
    pub async fn persist(&self) -> Result<usize, ServiceError> {
        let _flush = self.flush_lock.lock().await;
        let (data, count) = {
            let items = self.inner.read().await;
            let data = serde_json::to_vec_pretty(&*items)
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
            (data, items.len())
        };
        let tmp = temp_path(&self.file_path);
        fs::write(&tmp, data).await.map_err(storage_err)?;
        fs::rename(&tmp, &self.file_path).await.map_err(storage_err)?;
        debug!(path = %self.file_path.display(), count, "json list store persisted");
        Ok(count)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn storage_err(e: std::io::Error) -> ServiceError {
    ServiceError::Storage(e.to_string())
}
