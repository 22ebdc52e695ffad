use std::{
    fs, io,
    path::{Path, PathBuf},
};

use glam::UVec2;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not access config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Config file is not valid TOML")]
    Parse(#[from] toml::de::Error),
    #[error("Config value could not be serialized")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings which persist between runs of an app, stored as TOML next to it.
///
/// Loaded before the window opens and written back when the app quits. Apps keep
/// their own entries in [`ConfigFile::app`], which is flattened into the same table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub is_window_maximized: bool,
    /// Size of the window the last time it wasn't maximized.
    pub last_window_size: UVec2,
    #[serde(flatten)]
    pub app: toml::Table,

    #[serde(skip)]
    path: PathBuf,
    #[serde(skip)]
    disable_write: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            is_window_maximized: false,
            last_window_size: UVec2::new(1280, 720),
            app: toml::Table::new(),
            path: PathBuf::new(),
            disable_write: true,
        }
    }
}

impl ConfigFile {
    /// Default settings which will be written to `path`.
    pub fn new(path: impl Into<PathBuf>, disable_write: bool) -> Self {
        Self {
            path: path.into(),
            disable_write,
            ..Self::default()
        }
    }

    /// Reads the file at `path`. A missing file gives the defaults.
    pub fn load(path: impl Into<PathBuf>, disable_write: bool) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", path.display());
                return Ok(Self::new(path, disable_write));
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let mut config = Self::parse(&text)?;
        config.path = path;
        config.disable_write = disable_write;
        log::debug!("Loaded config file {}", config.path.display());
        Ok(config)
    }

    /// Parses a config from TOML text. The result is not backed by a file.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.last_window_size = config.last_window_size.max(UVec2::ONE);
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes the config back to its file, unless writing is disabled.
    pub fn write(&self) -> Result<(), ConfigError> {
        if self.disable_write {
            log::debug!("Config writing is disabled, not writing {}", self.path.display());
            return Ok(());
        }

        let text = self.to_toml_string()?;
        fs::write(&self.path, text).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Wrote config file {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_disabled(&self) -> bool {
        self.disable_write
    }

    /// An app specific entry. `None` if it is missing or has the wrong type.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.app.get(key)?.clone().try_into().ok()
    }

    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<(), ConfigError> {
        self.app.insert(key.into(), toml::Value::try_from(value)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_use_defaults() {
        let config = ConfigFile::parse("is_window_maximized = true").unwrap();
        assert!(config.is_window_maximized);
        assert_eq!(config.last_window_size, UVec2::new(1280, 720));
        assert!(config.app.is_empty());
    }

    #[test]
    fn app_entries_survive_a_round_trip() {
        let mut config = ConfigFile::new("Config.toml", true);
        config.last_window_size = UVec2::new(640, 480);
        config.set("player_name", "ferris").unwrap();
        config.set("volume", 0.5).unwrap();

        let text = config.to_toml_string().unwrap();
        let parsed = ConfigFile::parse(&text).unwrap();

        assert_eq!(parsed.last_window_size, UVec2::new(640, 480));
        assert_eq!(parsed.get::<String>("player_name").as_deref(), Some("ferris"));
        assert_eq!(parsed.get::<f64>("volume"), Some(0.5));
        assert_eq!(parsed.get::<u32>("player_name"), None);
        assert_eq!(parsed.get::<u32>("missing"), None);
    }

    #[test]
    fn window_size_is_never_zero() {
        let config = ConfigFile::parse("last_window_size = [0, 300]").unwrap();
        assert_eq!(config.last_window_size, UVec2::new(1, 300));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            ConfigFile::parse("last_window_size = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn disabled_write_touches_nothing() {
        let path = std::env::temp_dir().join("rendgl-framework-disabled-write.toml");
        let _ = fs::remove_file(&path);

        let config = ConfigFile::new(&path, true);
        config.write().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn load_and_write() {
        let path = std::env::temp_dir().join(format!("rendgl-framework-{}.toml", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut config = ConfigFile::load(&path, false).unwrap();
        assert_eq!(config, ConfigFile::new(&path, false));

        config.is_window_maximized = true;
        config.write().unwrap();

        let loaded = ConfigFile::load(&path, false).unwrap();
        assert!(loaded.is_window_maximized);
        assert_eq!(loaded.path(), path.as_path());

        fs::remove_file(&path).unwrap();
    }
}
