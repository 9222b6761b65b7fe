//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file e le copie verso la destinazione.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di tutti i file della directory sorgente
//! - Costruzione dei `FileEntry` (path, estensione minuscola, nome base)
//! - Copia byte-per-byte preservando permessi e timestamp
//! - Formattazione human-readable delle dimensioni
//!
//! ## Discovery:
//! La lista completa viene materializzata prima dell'elaborazione, così la
//! progress bar conosce il totale. Le directory non vengono elaborate; le entry
//! illeggibili vengono loggate e saltate. L'ordine di visita è per nome file,
//! quindi due run sullo stesso albero elaborano i file nello stesso ordine.
//!
//! ## Esempio:
//! ```ignore
//! let files = FileManager::find_all_files(Path::new("/media/DCIM"));
//! for path in files {
//!     let entry = FileEntry::from_path(&path);
//! }
//! ```

use crate::error::ImportError;
use filetime::FileTime;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub source_path: PathBuf,
    /// Lowercased extension without the dot, empty when there is none
    pub extension: String,
    /// File name for display; lossy when the name is not valid UTF-8
    pub base_name: String,
}

impl FileEntry {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source_path: path.to_path_buf(),
            extension,
            base_name,
        }
    }

    /// Raw file name, bytes preserved
    pub fn file_name(&self) -> &OsStr {
        self.source_path.file_name().unwrap_or_default()
    }

    /// File name without its extension, original case preserved
    pub fn stem(&self) -> &OsStr {
        self.source_path.file_stem().unwrap_or_default()
    }

    /// File name lowercased. Names that are not valid UTF-8 only get their
    /// ASCII letters lowercased, the other bytes are kept as they are.
    pub fn lowercase_name(&self) -> OsString {
        let name = self.file_name();
        match name.to_str() {
            Some(utf8) => utf8.to_lowercase().into(),
            None => name.to_ascii_lowercase(),
        }
    }

    /// Stem followed by `.{extension}`
    pub fn with_extension(&self, extension: &str) -> OsString {
        let mut name = self.stem().to_os_string();
        name.push(".");
        name.push(extension);
        name
    }
}

/// Manages file discovery and copies
pub struct FileManager;

impl FileManager {
    /// Collect every regular file below `source_dir`.
    /// Links to files are followed, links to directories are not.
    pub fn find_all_files(source_dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", source_dir.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_file() {
                files.push(entry.into_path());
            } else if entry.path_is_symlink() {
                match std::fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => files.push(entry.into_path()),
                    Ok(_) => debug!("Not following directory link: {}", entry.path().display()),
                    Err(e) => warn!("Skipping broken link {}: {}", entry.path().display(), e),
                }
            }
        }

        files
    }

    /// Copy `source` to `target`, keeping permissions and access/modification times.
    /// An existing target is overwritten. Returns the number of bytes copied.
    pub async fn copy_preserving_metadata(source: &Path, target: &Path) -> Result<u64, ImportError> {
        if Self::is_same_file(source, target) {
            debug!("Source and target are the same file, nothing to copy: {}", source.display());
            return Ok(0);
        }

        let bytes = tokio::fs::copy(source, target).await?;

        let metadata = tokio::fs::metadata(source).await?;
        let mtime = FileTime::from_last_modification_time(&metadata);
        let atime = FileTime::from_last_access_time(&metadata);
        filetime::set_file_times(target, atime, mtime)?;

        Ok(bytes)
    }

    fn is_same_file(source: &Path, target: &Path) -> bool {
        match (source.canonicalize(), target.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
