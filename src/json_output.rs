//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (`--json`), una riga
//! per evento, per chi pilota l'importer da un altro processo.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio import con il numero totale di file
//! - `transcode_started` / `transcode_finished`: Vita di un processo ffmpeg
//! - `file_complete`: Fine elaborazione di un file (esito ed eventuale errore)
//! - `complete`: Fine del run con le statistiche finali

use crate::importer::events::{FileOutcome, ImportEvent, ImportObserver};
use crate::progress::ImportStats;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Tipo di messaggio JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        source_dir: String,
        target_dir: String,
        total_files: usize,
    },
    TranscodeStarted {
        file: String,
        target: String,
        verbose: bool,
    },
    TranscodeFinished {
        file: String,
        success: bool,
    },
    FileComplete {
        file: String,
        index: usize,
        total: usize,
        /// copied / converted / skipped / failed
        status: String,
        target: Option<String>,
        error: Option<String>,
    },
    Complete {
        stats: ImportStats,
    },
}

impl From<&ImportEvent> for JsonMessage {
    fn from(event: &ImportEvent) -> Self {
        match event {
            ImportEvent::Started {
                source_dir,
                target_dir,
                total_files,
            } => Self::Start {
                source_dir: path_text(source_dir),
                target_dir: path_text(target_dir),
                total_files: *total_files,
            },
            ImportEvent::TranscodeStarted { file, target, mode } => Self::TranscodeStarted {
                file: file.clone(),
                target: path_text(target),
                verbose: *mode == crate::video_processor::TranscodeMode::Verbose,
            },
            ImportEvent::TranscodeFinished { file, success, .. } => Self::TranscodeFinished {
                file: file.clone(),
                success: *success,
            },
            ImportEvent::FileFinished {
                index,
                total,
                file,
                outcome,
            } => {
                let (status, target, error) = match outcome {
                    FileOutcome::Copied { target, .. } => ("copied", Some(path_text(target)), None),
                    FileOutcome::Converted { target, .. } => ("converted", Some(path_text(target)), None),
                    FileOutcome::Skipped => ("skipped", None, None),
                    FileOutcome::Failed { message } => ("failed", None, Some(message.clone())),
                };
                Self::FileComplete {
                    file: file.clone(),
                    index: *index,
                    total: *total,
                    status: status.to_string(),
                    target,
                    error,
                }
            }
            ImportEvent::Completed { stats } => Self::Complete { stats: stats.clone() },
        }
    }
}

/// Paths are emitted as text; bytes that are not valid UTF-8 become U+FFFD
fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Observer che scrive un messaggio JSON per riga
pub struct JsonReporter<W: Write> {
    writer: W,
}

impl JsonReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ImportObserver for JsonReporter<W> {
    fn on_event(&mut self, event: &ImportEvent) {
        let json = match serde_json::to_string(&JsonMessage::from(event)) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize JSON event: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(self.writer, "{}", json).and_then(|_| self.writer.flush()) {
            warn!("Failed to write JSON event: {}", e);
        }
    }
}
