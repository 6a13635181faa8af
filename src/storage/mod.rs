use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::export::Snapshot;
use crate::log::{ActionLog, LogError};
use thiserror::Error;

const PICTURES_SUBDIR: &str = "Pictures";
const EXPORT_SUBDIR: &str = "sketchlog";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("invalid export name {0:?}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Log(#[from] LogError),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Files written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub image: PathBuf,
    pub log: PathBuf,
    pub archive: PathBuf,
}

/// Writes drawings into a single export directory and reads logs back.
#[derive(Debug, Clone)]
pub struct StorageService {
    export_dir: PathBuf,
}

impl StorageService {
    pub const fn with_dir(export_dir: PathBuf) -> Self {
        Self { export_dir }
    }

    /// Uses `export_dir` from config, else `$HOME/Pictures/sketchlog`.
    pub fn from_config(config: &AppConfig) -> StorageResult<Self> {
        let export_dir = match &config.export_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = std::env::var_os("HOME").ok_or(StorageError::MissingHomeDirectory)?;
                let mut dir = PathBuf::from(home);
                dir.push(PICTURES_SUBDIR);
                dir.push(EXPORT_SUBDIR);
                dir
            }
        };
        Ok(Self::with_dir(export_dir))
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    fn validate_name(name: &str) -> StorageResult<()> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    pub fn target_path(&self, name: &str, extension: &str) -> StorageResult<PathBuf> {
        Self::validate_name(name)?;
        let mut path = self.export_dir.clone();
        path.push(format!("{name}.{extension}"));
        Ok(path)
    }

    pub fn save_png(&self, name: &str, png: &[u8]) -> StorageResult<PathBuf> {
        self.write(self.target_path(name, "png")?, png)
    }

    pub fn save_log(&self, name: &str, log_json: &str) -> StorageResult<PathBuf> {
        self.write(self.target_path(name, "json")?, log_json.as_bytes())
    }

    pub fn save_archive(&self, name: &str, archive: &[u8]) -> StorageResult<PathBuf> {
        self.write(self.target_path(name, "zip")?, archive)
    }

    pub fn save_export(
        &self,
        name: &str,
        snapshot: &Snapshot,
        archive: &[u8],
    ) -> StorageResult<ExportPaths> {
        Ok(ExportPaths {
            image: self.save_png(name, &snapshot.png)?,
            log: self.save_log(name, &snapshot.log_json)?,
            archive: self.save_archive(name, archive)?,
        })
    }

    pub fn load_log(&self, path: &Path) -> StorageResult<ActionLog> {
        let contents = fs::read_to_string(path)?;
        Ok(ActionLog::from_json(&contents)?)
    }

    fn write(&self, path: PathBuf, bytes: &[u8]) -> StorageResult<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote export file");
        Ok(path)
    }
}
