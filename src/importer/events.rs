//! # Import Events
//!
//! Eventi emessi dall'orchestratore verso il livello di presentazione.
//! La console (progress bar + spinner) e l'output JSON sono due
//! implementazioni di `ImportObserver`; la pipeline non stampa nulla da sola.

use crate::classifier::Action;
use crate::progress::ImportStats;
use crate::video_processor::TranscodeMode;
use std::path::PathBuf;

/// Result of handling a single file, as reported to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Copied { target: PathBuf, bytes: u64 },
    Converted { action: Action, target: PathBuf },
    Skipped,
    Failed { message: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Something that happened during an import run
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    /// Enumeration finished, processing is about to start
    Started {
        source_dir: PathBuf,
        target_dir: PathBuf,
        total_files: usize,
    },
    /// An external transcoder is about to run for `file`
    TranscodeStarted {
        file: String,
        target: PathBuf,
        mode: TranscodeMode,
    },
    TranscodeFinished {
        file: String,
        mode: TranscodeMode,
        success: bool,
    },
    /// File `index` (0-based) of `total` is done, whatever the outcome
    FileFinished {
        index: usize,
        total: usize,
        file: String,
        outcome: FileOutcome,
    },
    Completed { stats: ImportStats },
}

/// Receives import events, e.g. to drive a progress display
pub trait ImportObserver {
    fn on_event(&mut self, event: &ImportEvent);
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl ImportObserver for NullObserver {
    fn on_event(&mut self, _event: &ImportEvent) {}
}

/// Observer that keeps every event, handy for tests and embedding
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<ImportEvent>,
}

impl ImportObserver for RecordingObserver {
    fn on_event(&mut self, event: &ImportEvent) {
        self.events.push(event.clone());
    }
}
