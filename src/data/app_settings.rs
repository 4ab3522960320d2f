use crate::calc::WeekStart;
use crate::data::persistence::Persistable;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub week_start: WeekStart,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            week_start: WeekStart::Sunday,
            log_level: "info".to_string(),
        }
    }
}

/// Wrapper that reads the `settings` key from config.yaml.
#[derive(Serialize, Deserialize, Default, Debug)]
pub(crate) struct SettingsWrapper {
    #[serde(default)]
    pub(crate) settings: AppSettings,
}

impl Persistable for SettingsWrapper {
    fn filename() -> &'static str {
        "config.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        Ok(SettingsWrapper::load()?.settings)
    }
}
