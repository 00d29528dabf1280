//! Watermark Store - the publish time of the newest video already filed.
//!
//! Stored as a single RFC 3339 timestamp in a plain UTF-8 text file.

use anyhow::{Context, Result};
use catalog::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default location, relative to the working directory
pub const DEFAULT_WATERMARK_FILE: &str = "latestVideoTimestamp.txt";

#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored watermark.
    ///
    /// A missing, unreadable or unparseable file is not an error: the run
    /// falls back to the default window.
    pub fn load(&self) -> Option<DateTime<Utc>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No watermark at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Cannot read watermark {}: {}", self.path.display(), e);
                return None;
            }
        };
        match parse_timestamp(raw.trim()) {
            Ok(watermark) => Some(watermark),
            Err(e) => {
                warn!("Ignoring corrupt watermark {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Overwrite the stored watermark.
    ///
    /// Written to a sibling temp file and renamed into place, so the file
    /// always holds either the old or the new value.
    pub fn save(&self, watermark: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating {}", parent.display()))?;
            }
        }
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, format_timestamp(watermark))
            .with_context(|| format!("Writing {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Replacing {}", self.path.display()))?;
        Ok(())
    }

    /// Store `latest` unless it would move the watermark backwards.
    ///
    /// Returns the value written, if any.
    pub fn advance(
        &self,
        previous: Option<DateTime<Utc>>,
        latest: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        if previous.is_some_and(|previous| latest <= previous) {
            debug!("Watermark already at or past {}", latest);
            return Ok(None);
        }
        self.save(latest)?;
        info!("Watermark advanced to {} in {}", latest, self.path.display());
        Ok(Some(latest))
    }
}
