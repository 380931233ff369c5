use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tabview_core::{RawDataSource, RawTabConfig};

use crate::error::{Result, StateError};

/// Name of the settings file looked up in the config directory.
pub const CONFIG_FILE: &str = "tabview.toml";

/// Viewer settings read from `tabview.toml`.
///
/// ```toml
/// data_tabs = "data-tabs.json"
/// data_sources = "data-sources.json"
/// default_tab = "overview"
/// ```
///
/// Relative paths resolve against the directory holding the settings file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub data_tabs: PathBuf,
    pub data_sources: PathBuf,
    pub default_tab: Option<String>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_tabs: PathBuf::from("data-tabs.json"),
            data_sources: PathBuf::from("data-sources.json"),
            default_tab: None,
            base_dir: PathBuf::from("."),
        }
    }
}

impl ViewerConfig {
    /// Load `tabview.toml` from `dir`, falling back to defaults when absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            let content = fs::read_to_string(&path).map_err(|e| {
                StateError::InvalidData(format!("failed to read {}: {e}", path.display()))
            })?;
            Self::from_toml(&content)
                .map_err(|e| StateError::InvalidData(format!("{}: {e}", path.display())))?
        } else {
            tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, dir.display());
            Self::default()
        };
        config.base_dir = dir.to_path_buf();
        Ok(config)
    }

    /// Parse settings text. Paths stay relative to the current directory.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn data_tabs_path(&self) -> PathBuf {
        self.base_dir.join(&self.data_tabs)
    }

    pub fn data_sources_path(&self) -> PathBuf {
        self.base_dir.join(&self.data_sources)
    }
}

/// Everything the data view needs before its tabs can be derived.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataViewData {
    pub data_tabs: Vec<RawTabConfig>,
    pub data_sources: Vec<RawDataSource>,
}

/// Read the tab and data source JSON files named by `config`.
pub fn load_view_data(config: &ViewerConfig) -> Result<DataViewData> {
    let data_tabs = read_json(&config.data_tabs_path())?;
    let data_sources = read_json(&config.data_sources_path())?;
    let data = DataViewData {
        data_tabs,
        data_sources,
    };
    tracing::info!(
        tabs = data.data_tabs.len(),
        sources = data.data_sources.len(),
        "loaded data view configuration"
    );
    Ok(data)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(|e| {
        StateError::InvalidData(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&json)
        .map_err(|e| StateError::InvalidData(format!("invalid JSON in {}: {e}", path.display())))
}
