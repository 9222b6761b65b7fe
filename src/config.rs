//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione di un singolo run di importazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `ImportJob` con tutti i parametri del run
//! - Fornisce validazione dei parametri prima di toccare il filesystem
//! - Segnala i flag video che non hanno effetto senza `--include-videos`
//!
//! ## Parametri di configurazione:
//! - `source_dir`: Directory sorgente da scansionare ricorsivamente
//! - `target_dir`: Directory di destinazione piatta (creata se manca)
//! - `keep_heic`: Copia i file HEIC invece di convertirli in JPEG (default: false)
//! - `include_videos`: Abilita la gestione dei file MOV (default: false)
//! - `keep_mov`: Copia i MOV invece di convertirli in MP4 (default: false)
//! - `verbose_transcode`: Mostra l'output grezzo di ffmpeg (default: false)
//! - `include_png`: Copia anche i file PNG (default: false)
//! - `jpeg_quality`: Qualità JPEG per gli HEIC convertiti (1-100, default: 75)
//! - `json_output`: Eventi JSON su stdout al posto della progress bar
//!
//! Il job è immutabile per tutta la durata del run e viene passato per
//! riferimento a ogni operazione.
//!
//! ## Esempio:
//! ```ignore
//! let job = ImportJob {
//!     include_videos: true,
//!     ..ImportJob::new("/media/DCIM", "/home/me/Pictures/import")
//! };
//! job.validate()?;
//! ```

use crate::error::ImportError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a single import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportJob {
    /// Root scanned recursively for media files
    pub source_dir: PathBuf,
    /// Flat destination directory
    pub target_dir: PathBuf,
    /// Copy `.heic` files unmodified instead of converting to JPEG
    pub keep_heic: bool,
    /// Handle `.mov` files at all
    pub include_videos: bool,
    /// Copy `.mov` files unmodified instead of transcoding (needs `include_videos`)
    pub keep_mov: bool,
    /// Pass ffmpeg output through instead of showing a spinner (needs `include_videos`)
    pub verbose_transcode: bool,
    /// Copy `.png` files as well
    pub include_png: bool,
    /// JPEG quality used for converted HEIC images (1-100)
    pub jpeg_quality: u8,
    /// Emit JSON-lines events instead of the progress bar
    pub json_output: bool,
}

impl Default for ImportJob {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            target_dir: PathBuf::new(),
            keep_heic: false,
            include_videos: false,
            keep_mov: false,
            verbose_transcode: false,
            include_png: false,
            jpeg_quality: 75,
            json_output: false,
        }
    }
}

impl ImportJob {
    /// Create a job with default flags for the given directories
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            ..Default::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.source_dir.exists() {
            return Err(ImportError::Validation(format!(
                "Source directory does not exist: {}",
                self.source_dir.display()
            ))
            .into());
        }

        if !self.source_dir.is_dir() {
            return Err(ImportError::Validation(format!(
                "Source path is not a directory: {}",
                self.source_dir.display()
            ))
            .into());
        }

        if self.target_dir.exists() && !self.target_dir.is_dir() {
            return Err(ImportError::Validation(format!(
                "Target path is not a directory: {}",
                self.target_dir.display()
            ))
            .into());
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ImportError::Validation("JPEG quality must be between 1 and 100".to_string()).into());
        }

        Ok(())
    }

    /// One-line description for logs: JSON, or the `Debug` form when a
    /// path cannot be serialized
    pub fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Warnings for video flags that have no effect without `include_videos`
    pub fn ignored_flag_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.include_videos {
            return warnings;
        }

        if self.keep_mov {
            warnings.push("--keep-mov has no effect without --include-videos");
        }
        if self.verbose_transcode {
            warnings.push("--verbose-ffmpeg has no effect without --include-videos");
        }

        warnings
    }
}
