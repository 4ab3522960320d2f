use crate::data::app_settings::SettingsWrapper;
use crate::data::persistence::{Persistable, StoreFile};
use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir)?;
    println!("Data files initialized successfully.");
    Ok(())
}

/// Writes the default config into `dir`. An existing store is left alone so
/// re-running init never loses notes.
pub(crate) fn run_in_dir(dir: &Path) -> Result<()> {
    SettingsWrapper::default().save_to(dir)?;
    if !dir.join(StoreFile::filename()).exists() {
        StoreFile::default().save_to(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AppSettings, FileStore, KeyValueStore};
    use tempfile::TempDir;

    #[test]
    fn test_run_in_dir_creates_files() {
        let tmp = TempDir::new().unwrap();
        run_in_dir(tmp.path()).unwrap();
        assert!(tmp.path().join("config.yaml").exists());
        assert!(tmp.path().join("store.json").exists());
    }

    #[test]
    fn test_config_has_default_settings() {
        let tmp = TempDir::new().unwrap();
        run_in_dir(tmp.path()).unwrap();
        let loaded = SettingsWrapper::load_from(tmp.path()).unwrap();
        assert_eq!(loaded.settings, AppSettings::default());
    }

    #[test]
    fn test_store_starts_empty() {
        let tmp = TempDir::new().unwrap();
        run_in_dir(tmp.path()).unwrap();
        let contents = fs::read_to_string(tmp.path().join("store.json")).unwrap();
        assert_eq!(contents.trim(), "{}");
    }

    #[test]
    fn test_rerun_keeps_existing_store() {
        let tmp = TempDir::new().unwrap();
        run_in_dir(tmp.path()).unwrap();
        let mut store = FileStore::open(tmp.path());
        store.set("calEvents", r#"{"2024-03-05":"Dentist"}"#.to_string()).unwrap();

        run_in_dir(tmp.path()).unwrap();
        let reopened = FileStore::open(tmp.path());
        assert!(reopened.get("calEvents").is_some());
    }
}
