//! Layered JSON configuration: built-in defaults, `./config.json`, the user
//! file in the home directory, then an explicit `--config` file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use vuls_core::{
    default_keybindings, ConfigError, KeyEventRouter, KeybindingConfig, Keymap, PageNumber,
    DEFAULT_MODE, LAST_PAGE_PLACEHOLDER,
};
use vuls_engine::{
    AtomicFileWriter, FetchSettings, PageSettings, PersistError, DEFAULT_BASE_ORIGIN,
    DEFAULT_PAGE_URL_TEMPLATE,
};
use vuls_logging::{vuls_info, vuls_warn};

pub const LOCAL_CONFIG_FILENAME: &str = "config.json";
pub const USER_CONFIG_FILENAME: &str = ".hitcon-vuls-crawler-config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub keybindings: KeybindingConfig,
    pub default_mode: String,
    pub key_sequence_timeout_ms: u64,
    pub last_page_placeholder: PageNumber,
    pub theme: ThemeConfig,
    pub display: DisplayConfig,
    pub network: NetworkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keybindings: default_keybindings(),
            default_mode: DEFAULT_MODE.to_string(),
            key_sequence_timeout_ms: 500,
            last_page_placeholder: LAST_PAGE_PLACEHOLDER,
            theme: ThemeConfig::default(),
            display: DisplayConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub border: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "magenta".to_string(),
            accent: "yellow".to_string(),
            border: "blue".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_page_numbers: bool,
    pub show_help_bar: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_page_numbers: true,
            show_help_bar: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub page_url_template: String,
    pub base_origin: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            page_url_template: DEFAULT_PAGE_URL_TEMPLATE.to_string(),
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            user_agent: fetch.user_agent,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid configuration: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid keybindings: {0}")]
    Invalid(#[from] ConfigError),
    #[error("cannot serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("cannot write configuration: {0}")]
    Persist(#[from] PersistError),
}

/// One file in the configuration stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub path: PathBuf,
    /// Missing or malformed files are fatal rather than skipped.
    pub required: bool,
    /// Replaces everything below it instead of merging.
    pub replaces: bool,
}

impl ConfigLayer {
    /// The standard stack for this process.
    pub fn standard(explicit: Option<&Path>) -> Vec<ConfigLayer> {
        let mut layers = vec![ConfigLayer {
            path: PathBuf::from(LOCAL_CONFIG_FILENAME),
            required: false,
            replaces: true,
        }];
        if let Some(path) = user_config_path() {
            layers.push(ConfigLayer {
                path,
                required: false,
                replaces: false,
            });
        }
        if let Some(path) = explicit {
            layers.push(ConfigLayer {
                path: path.to_path_buf(),
                required: true,
                replaces: false,
            });
        }
        layers
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(USER_CONFIG_FILENAME))
}

/// Loads the stack in order. A present `./config.json` is authoritative and
/// only fails hard if it cannot be parsed. Each layer is checked against the
/// schema as it is applied, so a broken optional layer is skipped on its own
/// and errors name the file that caused them.
pub fn load(layers: &[ConfigLayer]) -> Result<AppConfig, ConfigLoadError> {
    let mut merged =
        serde_json::to_value(AppConfig::default()).map_err(ConfigLoadError::Serialize)?;
    let mut config = AppConfig::default();

    for layer in layers {
        let applied = read_layer(&layer.path).and_then(|overlay| match overlay {
            Some(overlay) => apply_layer(&merged, overlay, layer).map(Some),
            None => Ok(None),
        });
        match applied {
            Ok(Some((candidate, typed))) => {
                vuls_info!("Loaded configuration from {}", layer.path.display());
                merged = candidate;
                config = typed;
            }
            Ok(None) if layer.required => {
                return Err(ConfigLoadError::Io {
                    path: layer.path.clone(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            Ok(None) => {}
            Err(err) if layer.required || layer.replaces => return Err(err),
            Err(err) => {
                vuls_warn!("Skipping configuration: {err}");
                eprintln!("Warning: could not load user config: {err}");
            }
        }
    }

    Ok(config)
}

/// Merges `overlay` onto a copy of `base` and checks the result.
fn apply_layer(
    base: &Value,
    overlay: Value,
    layer: &ConfigLayer,
) -> Result<(Value, AppConfig), ConfigLoadError> {
    let candidate = if layer.replaces {
        overlay
    } else {
        let mut candidate = base.clone();
        merge_sections(&mut candidate, overlay);
        candidate
    };
    let typed = serde_json::from_value(candidate.clone()).map_err(|source| {
        ConfigLoadError::Parse {
            path: layer.path.clone(),
            source,
        }
    })?;
    Ok((candidate, typed))
}

fn read_layer(path: &Path) -> Result<Option<Value>, ConfigLoadError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigLoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let value: Value = serde_json::from_str(&text).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Object sections merge key by key; anything else replaces.
fn merge_sections(base: &mut Value, overlay: Value) {
    let (Value::Object(base), Value::Object(overlay)) = (base, overlay) else {
        return;
    };
    for (key, value) in overlay {
        match value {
            Value::Object(entries) => match base.get_mut(&key) {
                Some(Value::Object(section)) => section.extend(entries),
                _ => {
                    base.insert(key, Value::Object(entries));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

impl AppConfig {
    pub fn mode<'a>(&'a self, mode_override: Option<&'a str>) -> &'a str {
        mode_override.unwrap_or(&self.default_mode)
    }

    pub fn sequence_timeout(&self) -> Result<Duration, ConfigError> {
        if self.key_sequence_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Duration::from_millis(self.key_sequence_timeout_ms))
    }

    /// Checks every mode in `keybindings`, not just the active one.
    pub fn validate_keybindings(&self) -> Result<(), ConfigError> {
        for (mode, bindings) in &self.keybindings {
            Keymap::from_bindings(mode, bindings)?;
        }
        Ok(())
    }

    /// Validated router for the selected mode; any error in any mode aborts
    /// startup.
    pub fn router(&self, mode_override: Option<&str>) -> Result<KeyEventRouter, ConfigError> {
        self.validate_keybindings()?;
        let keymap = Keymap::for_mode(&self.keybindings, self.mode(mode_override))?;
        Ok(KeyEventRouter::new(keymap, self.sequence_timeout()?))
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.network.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.network.request_timeout_secs),
            user_agent: self.network.user_agent.clone(),
            ..FetchSettings::default()
        }
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            url_template: self.network.page_url_template.clone(),
            base_origin: self.network.base_origin.clone(),
        }
    }

    /// Writes this configuration to `path` unless a file already exists
    /// there. Returns whether a file was written.
    pub fn write_template(&self, path: &Path) -> Result<bool, ConfigLoadError> {
        if path.exists() {
            return Ok(false);
        }
        let mut text = serde_json::to_string_pretty(self).map_err(ConfigLoadError::Serialize)?;
        text.push('\n');
        AtomicFileWriter::new(path).write(&text)?;
        vuls_info!("Wrote configuration template to {}", path.display());
        Ok(true)
    }
}
