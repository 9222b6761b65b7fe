//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la progress bar e le statistiche dell'importazione.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar principale (`indicatif`) più gli spinner
//!   dei transcode video, tutti ospitati in un `MultiProgress`
//! - `ImportStats`: Conteggi cumulativi del run
//!
//! ## Statistiche tracciate:
//! - **files_found**: File trovati dalla scansione
//! - **copied**: File copiati così come sono
//! - **converted**: HEIC → JPEG e MOV → MP4 riusciti
//! - **skipped**: File ignorati (estensione non gestita, MOV senza `--include-videos`)
//! - **failed**: File il cui processing è fallito
//! - **bytes_copied**: Byte copiati
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 150/240 (62%) img_0150.jpg
//! ✅ Clip.MOV → Clip.mp4
//! ```

use crate::file_manager::FileManager;
use crate::importer::events::FileOutcome;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Manages the progress bar and transcode spinners
pub struct ProgressManager {
    multi: MultiProgress,
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        Self::with_draw_target(total_files, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(total_files: u64, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let bar = multi.add(ProgressBar::new(total_files));

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { multi, bar }
    }

    /// Advance by one file and show a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Print a line above the bars
    pub fn println(&self, message: &str) {
        if self.multi.println(message).is_err() {
            eprintln!("{}", message);
        }
    }

    /// Stop drawing, e.g. while an external process owns the terminal
    pub fn hide(&self) {
        self.multi.set_draw_target(ProgressDrawTarget::hidden());
    }

    pub fn show(&self) {
        self.multi.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Create a spinner below the main bar
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = self.multi.add(ProgressBar::new_spinner());

        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }

        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        spinner
    }
}

/// Statistics for one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub files_found: usize,
    pub copied: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_copied: u64,
}

impl ImportStats {
    pub fn new(files_found: usize) -> Self {
        Self {
            files_found,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Copied { bytes, .. } => {
                self.copied += 1;
                self.bytes_copied += bytes;
            }
            FileOutcome::Converted { .. } => self.converted += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.copied + self.converted + self.skipped + self.failed
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Copied: {} ({}) | Converted: {} | Skipped: {} | Failed: {}",
            self.processed(),
            self.copied,
            FileManager::format_size(self.bytes_copied),
            self.converted,
            self.skipped,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Action;
    use std::path::PathBuf;

    #[test]
    fn test_stats_record() {
        let mut stats = ImportStats::new(4);
        stats.record(&FileOutcome::Copied {
            target: PathBuf::from("/t/a.jpg"),
            bytes: 2048,
        });
        stats.record(&FileOutcome::Converted {
            action: Action::ConvertImage,
            target: PathBuf::from("/t/b.jpg"),
        });
        stats.record(&FileOutcome::Skipped);
        stats.record(&FileOutcome::Failed {
            message: "boom".to_string(),
        });

        assert_eq!(stats.processed(), 4);
        assert_eq!(stats.files_found, 4);
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.bytes_copied, 2048);
    }

    #[test]
    fn test_summary_format() {
        let stats = ImportStats {
            files_found: 3,
            copied: 2,
            converted: 1,
            bytes_copied: 1024,
            ..Default::default()
        };
        assert_eq!(
            stats.format_summary(),
            "Processed: 3 files | Copied: 2 (1.00 KB) | Converted: 1 | Skipped: 0 | Failed: 0"
        );
    }

    #[test]
    fn test_progress_advances_once_per_update() {
        let progress = ProgressManager::with_draw_target(3, ProgressDrawTarget::hidden());
        progress.update("a.jpg");
        progress.update("b.jpg");
        assert_eq!(progress.position(), 2);

        let spinner = progress.spinner("Converting Clip.MOV");
        spinner.finish_with_message("done");
        progress.finish("done");
    }
}
