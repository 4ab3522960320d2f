use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Set once at startup by main() from the --data-dir argument.
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Call this from main() before any load/save operations.
pub fn set_data_dir(path: PathBuf) {
    let _ = DATA_DIR.set(path);
}

pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = DATA_DIR.get() {
        return Ok(dir.clone());
    }
    // Fallback when running tests or if set_data_dir was not called
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join("config"))
}

fn parse<T: for<'de> Deserialize<'de>>(contents: &str, path: &Path, json: bool) -> Result<T> {
    if json {
        serde_json::from_str(contents)
            .with_context(|| format!("failed to parse JSON from {}", path.display()))
    } else {
        serde_norway::from_str(contents)
            .with_context(|| format!("failed to parse YAML from {}", path.display()))
    }
}

pub trait Persistable: Sized + Default + Serialize + for<'de> Deserialize<'de> {
    fn filename() -> &'static str;
    fn is_json() -> bool;

    fn load() -> Result<Self> {
        let dir = get_data_dir()?;
        Self::load_from(&dir)
    }

    /// Load from an explicit directory, bypassing the global `DATA_DIR`.
    fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::filename());
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse(&contents, &path, Self::is_json())
    }

    /// Save to an explicit directory, bypassing the global `DATA_DIR`.
    fn save_to(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create dir {}", dir.display()))?;
        let path = dir.join(Self::filename());
        let contents = if Self::is_json() {
            serde_json::to_string_pretty(self).context("failed to serialize JSON")?
        } else {
            serde_norway::to_string(self).context("failed to serialize YAML")?
        };
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Flat string-to-string store. Values are opaque to the store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// On-disk layout of `store.json`: one JSON object, every value a string.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct StoreFile {
    pub entries: BTreeMap<String, String>,
}

impl Persistable for StoreFile {
    fn filename() -> &'static str {
        "store.json"
    }
    fn is_json() -> bool {
        true
    }
}

/// `KeyValueStore` backed by `store.json` in a data directory. The file is
/// read once on open and rewritten in full on every `set`.
pub struct FileStore {
    dir: PathBuf,
    file: StoreFile,
}

impl FileStore {
    /// Opens the store in `dir`. A corrupt file is treated as empty.
    pub fn open(dir: &Path) -> Self {
        let file = StoreFile::load_from(dir).unwrap_or_else(|e| {
            warn!("event=store_open status=corrupt dir={} error={:#}", dir.display(), e);
            StoreFile::default()
        });
        FileStore {
            dir: dir.to_path_buf(),
            file,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.file.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.file.entries.insert(key.to_string(), value);
        self.file.save_to(&self.dir)
    }
}

/// In-memory store that records every write, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    pub entries: std::collections::HashMap<String, String>,
    pub writes: Vec<(String, String)>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn last_write(&self) -> Option<(&str, &str)> {
        self.writes.last().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("store is read-only");
        }
        self.writes.push((key.to_string(), value.clone()));
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
