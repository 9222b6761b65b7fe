//! # DCIMinator Library
//!
//! Importa foto e video da una sorgente (es. la cartella DCIM di un telefono
//! montato) in una directory di destinazione piatta.
//!
//! ## Architettura dei moduli:
//! - `config`: `ImportJob`, parametri immutabili del run e validazione
//! - `error`: Tipi di errore custom (`ImportError`)
//! - `file_manager`: Discovery ricorsiva e copie con metadata
//! - `classifier`: Estensione + flag → `Action` e path di destinazione
//! - `image_processor`: Decoder HEIC e encoder JPEG
//! - `video_processor`: Transcode MOV → MP4 con ffmpeg
//! - `tool_resolver`: Ricerca dei binari esterni
//! - `importer`: Orchestratore, worker per file, eventi e console
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```ignore
//! use dciminator::{ImportJob, MediaImporter, ConsoleReporter};
//!
//! let importer = MediaImporter::new(ImportJob::new("/media/DCIM", "/photos"))?;
//! let stats = importer.run(&mut ConsoleReporter::new()).await?;
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod importer;
pub mod json_output;
pub mod progress;
pub mod tool_resolver;
pub mod video_processor;

pub use classifier::{classify, Action, Classification};
pub use config::ImportJob;
pub use error::ImportError;
pub use importer::{ConsoleReporter, ImportEvent, ImportObserver, MediaImporter};
pub use json_output::JsonReporter;
pub use progress::ImportStats;
