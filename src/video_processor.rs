//! # Video Processing Module
//!
//! Questo modulo gestisce la conversione MOV → MP4 tramite FFmpeg.
//!
//! ## Comando:
//! ```text
//! ffmpeg -i IN.MOV -c:v libx264 -c:a aac -y OUT.mp4
//! ```
//! - Codec video: H.264 (libx264)
//! - Codec audio: AAC
//! - `-y`: l'output esistente viene sovrascritto senza conferma
//!
//! ## Modalità:
//! - `TranscodeMode::Verbose`: l'output di ffmpeg passa direttamente sulla
//!   console, tutto su stderr (stdout resta libero per l'output `--json`)
//! - `TranscodeMode::Silent`: l'output viene scartato; lo stderr viene tenuto
//!   solo per arricchire il messaggio d'errore
//!
//! Spinner e riga di stato appartengono al livello di presentazione
//! (`importer::progress_tracker`), non a questo adapter.
//!
//! ## Errori:
//! Exit code diverso da zero, oppure ffmpeg non trovato/non avviabile,
//! producono `ImportError::Transcode`. Non c'è timeout: un ffmpeg bloccato
//! blocca l'intero import.
//!
//! ## Esempio:
//! ```ignore
//! let transcoder = FfmpegTranscoder::new();
//! transcoder.transcode(&mov, &mp4, TranscodeMode::Silent)?;
//! ```

use crate::error::ImportError;
use crate::tool_resolver::ToolPathResolver;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// How much of the transcoder's own output reaches the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeMode {
    Silent,
    Verbose,
}

impl TranscodeMode {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Self::Verbose
        } else {
            Self::Silent
        }
    }
}

/// Converts a video file into another container/codec pair
pub trait VideoTranscoder {
    /// Blocks until the transcoder exits. A nonzero exit is an error.
    fn transcode(&self, input: &Path, output: &Path, mode: TranscodeMode) -> Result<ExitStatus, ImportError>;
}

/// Transcoder backed by the `ffmpeg` executable
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
    resolver: ToolPathResolver,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Use a different executable name or path
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            resolver: ToolPathResolver::new(),
        }
    }

    fn build_command(program: &Path, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg("-i")
            .arg(input)
            .args(["-c:v", "libx264", "-c:a", "aac", "-y"])
            .arg(output)
            .stdin(Stdio::null());
        cmd
    }
}

/// Last few lines of a captured stream
fn tail(stream: &[u8], lines: usize) -> String {
    let text = String::from_utf8_lossy(stream);
    let collected: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    collected[collected.len().saturating_sub(lines)..].join("\n")
}

impl VideoTranscoder for FfmpegTranscoder {
    fn transcode(&self, input: &Path, output: &Path, mode: TranscodeMode) -> Result<ExitStatus, ImportError> {
        let program = self
            .resolver
            .resolve_tool(&self.program)
            .ok_or_else(|| ImportError::Transcode(ToolPathResolver::missing_tool_message(&self.program)))?;

        debug!(
            "🎬 Transcoding {} -> {} ({:?})",
            input.display(),
            output.display(),
            mode
        );

        let mut cmd = Self::build_command(&program, input, output);
        let start_time = std::time::Instant::now();

        let (status, stderr) = match mode {
            TranscodeMode::Verbose => {
                let status = cmd
                    .stdout(Stdio::from(std::io::stderr()))
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|e| ImportError::Transcode(format!("failed to execute {}: {}", self.program, e)))?;
                (status, Vec::new())
            }
            TranscodeMode::Silent => {
                let out = cmd
                    .stdout(Stdio::null())
                    .stderr(Stdio::piped())
                    .output()
                    .map_err(|e| ImportError::Transcode(format!("failed to execute {}: {}", self.program, e)))?;
                (out.status, out.stderr)
            }
        };

        debug!("Transcoder finished in {:.1}s with {}", start_time.elapsed().as_secs_f64(), status);

        if !status.success() {
            let detail = tail(&stderr, 3);
            let message = if detail.is_empty() {
                format!("{} exited with {}", self.program, status)
            } else {
                format!("{} exited with {}: {}", self.program, status, detail)
            };
            return Err(ImportError::Transcode(message));
        }

        Ok(status)
    }
}
