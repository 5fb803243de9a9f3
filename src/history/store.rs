use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use cacache::RemoveOpts;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Durable get/set by key. Implementations report failures; callers decide
/// whether to absorb them.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Get the platform-appropriate data directory for car-value
pub fn get_store_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("car-value/store"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/car-value/store",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Content-addressed store in the user's cache directory, backed by cacache.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_path: PathBuf,
}

impl CacheStore {
    pub fn new(cache_path: PathBuf) -> Self {
        Self { cache_path }
    }
}

impl KeyValueStore for CacheStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let metadata = cacache::metadata_sync(&self.cache_path, key)
            .with_context(|| format!("Failed to look up '{}' in {}", key, self.cache_path.display()))?;
        if metadata.is_none() {
            return Ok(None);
        }
        let bytes = cacache::read_sync(&self.cache_path, key)
            .with_context(|| format!("Failed to read '{}' from {}", key, self.cache_path.display()))?;
        Ok(Some(bytes))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        // cacache only appends; drop the previous entry and content so the
        // slot holds one blob at a time.
        self.remove(key)?;
        cacache::write_sync(&self.cache_path, key, value)
            .with_context(|| format!("Failed to write '{}' to {}", key, self.cache_path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let metadata = cacache::metadata_sync(&self.cache_path, key)
            .with_context(|| format!("Failed to look up '{}' in {}", key, self.cache_path.display()))?;
        if metadata.is_none() {
            return Ok(());
        }
        RemoveOpts::new()
            .remove_fully(true)
            .remove_sync(&self.cache_path, key)
            .with_context(|| format!("Failed to remove '{}' from {}", key, self.cache_path.display()))?;
        Ok(())
    }
}

/// One JSON file per key inside a directory, written atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(bytes))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        ensure_dir(&self.dir)?;
        let path = self.path_for(key);

        let mut file = AtomicWriteFile::open(&path)
            .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
        file.write_all(value)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.commit()
            .with_context(|| format!("Failed to commit {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory at {}", dir.display()))?;
    }
    Ok(())
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore {
    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
