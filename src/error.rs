//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'importazione.
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O durante la copia (permessi, disco pieno, file sparito)
//! - `Decode`: File HEIC corrotto o non valido
//! - `Encode`: Scrittura JPEG fallita o pixel mode non supportato
//! - `Transcode`: ffmpeg terminato con exit code diverso da zero o non avviabile
//! - `MissingDependency`: Tool esterno mancante (heif-dec, magick, ...)
//! - `Validation`: Errori di validazione input
//!
//! ## Politica di propagazione:
//! Tutti gli errori per singolo file vengono intercettati dall'orchestratore
//! (`importer`), riportati con il nome del file e non interrompono il run.
//! Solo la validazione della configurazione e la creazione della directory
//! di destinazione sono fatali.
//!
//! ## Esempio:
//! ```ignore
//! if !status.success() {
//!     return Err(ImportError::Transcode(format!("ffmpeg exited with {}", status)));
//! }
//! ```

/// Custom error types for the import pipeline
#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HEIC decode error: {0}")]
    Decode(String),

    #[error("JPEG encode error: {0}")]
    Encode(String),

    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
