use crate::error::TimesheetError;
use crate::timesheet::Columns;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Settings read from `config.toml`; every key is optional.
///
/// ```toml
/// output_dir = "~/Downloads"
/// maildir = "~/Maildir"
///
/// [columns]
/// extra_hours = "Horas Extr."
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Names of the five timesheet columns
    pub columns: Columns,
    /// Folder that receives exported and merged files
    pub output_dir: PathBuf,
    /// Local inbox scanned for CSV attachments
    pub maildir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: Columns::default(),
            output_dir: PathBuf::from("."),
            maildir: PathBuf::from("~/Maildir"),
        }
    }
}

impl Config {
    /// Loads the explicit file, or the default location when `path` is `None`.
    /// A missing file gives the defaults; a malformed one is a `ConfigError`.
    pub fn load(path: Option<&Path>) -> Result<Self, TimesheetError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, TimesheetError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|error| TimesheetError::ConfigError(format!("{}: {}", path.display(), error)))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `<config dir>/rusty-timesheet/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rusty-timesheet").join("config.toml"))
    }
}
