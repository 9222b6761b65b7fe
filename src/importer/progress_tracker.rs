//! # Progress Tracking Module
//!
//! Presentazione su console degli eventi di import: progress bar con un
//! passo per file, spinner durante i transcode silenziosi, riga di stato e
//! barra nascosta durante i transcode verbose (ffmpeg scrive sul terminale).

use crate::{
    importer::events::{FileOutcome, ImportEvent, ImportObserver},
    progress::ProgressManager,
    video_processor::TranscodeMode,
};
use indicatif::{ProgressBar, ProgressDrawTarget};

/// Console observer backed by `indicatif`
#[derive(Default)]
pub struct ConsoleReporter {
    progress: Option<ProgressManager>,
    spinner: Option<ProgressBar>,
    hidden: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter that never draws, for tests and non-interactive use
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Default::default()
        }
    }

    fn println(&self, message: &str) {
        match self.progress {
            Some(ref progress) => progress.println(message),
            None if self.hidden => {}
            None => eprintln!("{}", message),
        }
    }

    /// Files advanced so far
    pub fn position(&self) -> u64 {
        self.progress.as_ref().map_or(0, |p| p.position())
    }

    fn file_message(file: &str, outcome: &FileOutcome) -> String {
        match outcome {
            FileOutcome::Copied { .. } => format!("✅ {}", file),
            FileOutcome::Converted { target, .. } => format!(
                "✅ {} → {}",
                file,
                target.file_name().unwrap_or_default().to_string_lossy()
            ),
            FileOutcome::Skipped => format!("⏩ {}: skipped", file),
            FileOutcome::Failed { .. } => format!("❌ {}: error", file),
        }
    }
}

impl ImportObserver for ConsoleReporter {
    fn on_event(&mut self, event: &ImportEvent) {
        match event {
            ImportEvent::Started { total_files, .. } => {
                let target = if self.hidden {
                    ProgressDrawTarget::hidden()
                } else {
                    ProgressDrawTarget::stderr()
                };
                self.progress = Some(ProgressManager::with_draw_target(*total_files as u64, target));
            }
            ImportEvent::TranscodeStarted { file, target, mode } => match mode {
                TranscodeMode::Verbose => {
                    if let Some(ref progress) = self.progress {
                        if !self.hidden {
                            progress.hide();
                        }
                    }
                    if !self.hidden {
                        eprintln!("🎬 Converting {} → {}", file, target.display());
                    }
                }
                TranscodeMode::Silent => {
                    if let Some(ref progress) = self.progress {
                        self.spinner = Some(progress.spinner(&format!("Converting {}...", file)));
                    }
                }
            },
            ImportEvent::TranscodeFinished { file, mode, success } => {
                let glyph = if *success { "✅" } else { "❌" };
                if let Some(spinner) = self.spinner.take() {
                    spinner.finish_with_message(format!("{} {}", glyph, file));
                }
                if *mode == TranscodeMode::Verbose {
                    if let Some(ref progress) = self.progress {
                        if !self.hidden {
                            progress.show();
                        }
                    }
                }
            }
            ImportEvent::FileFinished { file, outcome, .. } => {
                if let FileOutcome::Failed { message } = outcome {
                    self.println(&format!("⚠️ Failed to process {}: {}", file, message));
                }
                if let Some(ref progress) = self.progress {
                    progress.update(&Self::file_message(file, outcome));
                }
            }
            ImportEvent::Completed { stats } => {
                if let Some(ref progress) = self.progress {
                    progress.finish(&stats.format_summary());
                }
            }
        }
    }
}
