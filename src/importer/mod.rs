//! # Importer Module
//!
//! Modulo che separa le responsabilità dell'importazione in sottomoduli:
//! - `media_importer`: Orchestratore principale (enumerazione + loop sui file)
//! - `task_importer`: Classificazione e dispatch di un singolo file
//! - `events`: Eventi verso il livello di presentazione
//! - `progress_tracker`: Presentazione su console (progress bar + spinner)

pub mod events;
pub mod media_importer;
pub mod progress_tracker;
pub mod task_importer;

pub use events::{FileOutcome, ImportEvent, ImportObserver, NullObserver, RecordingObserver};
pub use media_importer::MediaImporter;
pub use progress_tracker::ConsoleReporter;
pub use task_importer::TaskImporter;
