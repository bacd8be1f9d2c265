use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::{LoanError, Result};
use crate::utils::{self, ensure_dir};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";

/// User-facing preferences persisted alongside the books.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// How many backup snapshots to keep per book.
    pub backup_retention: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_book: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-IN".into(),
            currency: "INR".into(),
            backup_retention: 5,
            last_opened_book: None,
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(utils::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        let config_root = utils::config_dir_in(&base);
        ensure_dir(&config_root)?;
        let backups_dir = utils::config_backups_dir_in(&base);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path: utils::config_file_in(&base),
            backups_dir,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)
                .map_err(|err| LoanError::ConfigError(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String> {
        ensure_dir(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut name = format!("config_{}", timestamp);
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(&format!(".{}", BACKUP_EXTENSION));
        let path = self.backups_dir.join(&name);
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&path, &json)?;
        Ok(name)
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
