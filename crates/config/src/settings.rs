use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use vendorbook_core::{ApplyMode, ExportFormat};

use crate::error::ConfigError;

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "VENDORBOOK_CONFIG";

/// Contents of `settings.toml`. Every key is optional.
///
/// ```toml
/// database = "/srv/vendorbook/suppliers.db"
/// page_size = 25
/// apply_mode = "best_effort"
/// export_format = "xlsx"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file. Unset means the per-user data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Records per page in `list`.
    pub page_size: u32,
    /// Commit contract for import apply.
    pub apply_mode: ApplyMode,
    /// Used by `export` when the output path has no known extension.
    pub export_format: ExportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            page_size: 10,
            apply_mode: ApplyMode::Transactional,
            export_format: ExportFormat::Csv,
        }
    }
}

impl Settings {
    /// `$VENDORBOOK_CONFIG`, else `<config dir>/vendorbook/settings.toml`.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vendorbook")
            .join("settings.toml")
    }

    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vendorbook")
            .join("vendorbook.db")
    }

    /// Load from [`Settings::config_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let settings = Self::parse(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Configured database, or the default location.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(Self::default_database_path)
    }
}
