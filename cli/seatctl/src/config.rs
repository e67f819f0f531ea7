//! Saved defaults.
//!
//! Stored as JSON in the platform config directory, or at `--config` /
//! `SEAT_CONFIG`. Command-line flags always win over saved values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use seatplan_allocate::{Buffer, Density};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_ROSTER: &str = "ip_1.xlsx";
pub const DEFAULT_TIMETABLE: &str = "ip_2.xlsx";
pub const DEFAULT_ROOMS: &str = "ip_3.xlsx";
pub const DEFAULT_NAMES: &str = "ip_4.xlsx";

/// Keys accepted by `seat config set`.
pub const KEYS: &[&str] = &[
    "roster",
    "rooms",
    "timetable",
    "names",
    "out_dir",
    "buffer",
    "density",
    "strict",
    "log_level",
];

fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "seatplan", "seat")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Config file location: the explicit path if given, else the default.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input workbook locations.
    #[serde(default)]
    pub inputs: InputPaths,

    /// Directory the output workbooks are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer: Option<Buffer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Density>,

    /// Fail the run when any student is left without a seat.
    #[serde(default)]
    pub strict: bool,

    /// Log filter used when `RUST_LOG` and `SEAT_LOG_LEVEL` are unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timetable: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<PathBuf>,
}

impl Config {
    /// Load config from disk, or return default if the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {:?}", dir))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
        }

        Ok(())
    }

    /// Sets one key from its text form, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "roster" => self.inputs.roster = Some(PathBuf::from(value)),
            "rooms" => self.inputs.rooms = Some(PathBuf::from(value)),
            "timetable" => self.inputs.timetable = Some(PathBuf::from(value)),
            "names" => self.inputs.names = Some(PathBuf::from(value)),
            "out_dir" => self.out_dir = Some(PathBuf::from(value)),
            "buffer" => {
                let raw: i64 = value
                    .trim()
                    .parse()
                    .map_err(|_| CliError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
                self.buffer = Some(Buffer::new(raw)?);
            }
            "density" => self.density = Some(value.parse()?),
            "strict" => {
                self.strict = value.trim().parse().map_err(|_| CliError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            "log_level" => self.log_level = Some(value.to_string()),
            other => return Err(CliError::UnknownConfigKey(other.to_string()).into()),
        }
        Ok(())
    }

    pub fn roster_path(&self) -> PathBuf {
        self.inputs
            .roster
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROSTER))
    }

    pub fn rooms_path(&self) -> PathBuf {
        self.inputs
            .rooms
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOMS))
    }

    pub fn timetable_path(&self) -> PathBuf {
        self.inputs
            .timetable
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TIMETABLE))
    }

    pub fn names_path(&self) -> PathBuf {
        self.inputs
            .names
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NAMES))
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.roster_path(), PathBuf::from(DEFAULT_ROSTER));
        assert_eq!(config.out_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = Config::default();
        config.set("rooms", "/data/rooms.xlsx").unwrap();
        config.set("buffer", "3").unwrap();
        config.set("density", "2").unwrap();
        config.set("strict", "true").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.rooms_path(), PathBuf::from("/data/rooms.xlsx"));
        assert_eq!(loaded.buffer.map(Buffer::get), Some(3));
        assert_eq!(loaded.density, Some(Density::Sparse));
        assert!(loaded.strict);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("buffer", "6").is_err());
        assert!(config.set("buffer", "lots").is_err());
        assert!(config.set("density", "3").is_err());
        assert!(config.set("strict", "maybe").is_err());

        let err = config.set("colour", "blue").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::UnknownConfigKey(key)) if key == "colour"
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_out_of_range_buffer_in_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "buffer": 9 }"#).unwrap();
        assert!(Config::load(&path).is_err());
    }
}
