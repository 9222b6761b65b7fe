//! # Task Importer Module
//!
//! Elaborazione di un singolo file: classificazione e dispatch verso copia,
//! conversione immagine o transcode video. Ogni errore viene restituito al
//! chiamante come `ImportError`; è l'orchestratore a decidere di proseguire.

use crate::{
    classifier::{classify, Action},
    config::ImportJob,
    error::ImportError,
    file_manager::{FileEntry, FileManager},
    image_processor::{convert_heic_to_jpeg, HeicDecoder},
    importer::events::{FileOutcome, ImportEvent, ImportObserver},
    video_processor::{TranscodeMode, VideoTranscoder},
};
use std::path::Path;
use tracing::debug;

/// Worker per elaborazione singoli file
pub struct TaskImporter<'a> {
    pub job: &'a ImportJob,
    pub decoder: &'a dyn HeicDecoder,
    pub transcoder: &'a dyn VideoTranscoder,
}

impl<'a> TaskImporter<'a> {
    pub fn new(job: &'a ImportJob, decoder: &'a dyn HeicDecoder, transcoder: &'a dyn VideoTranscoder) -> Self {
        Self {
            job,
            decoder,
            transcoder,
        }
    }

    /// Processa un singolo file
    pub async fn process_file(
        &self,
        entry: &FileEntry,
        observer: &mut dyn ImportObserver,
    ) -> Result<FileOutcome, ImportError> {
        let classification = classify(entry, self.job);
        debug!("{} -> {}", entry.source_path.display(), classification.action);

        match (classification.action, classification.target) {
            (Action::Copy, Some(target)) => {
                let bytes = FileManager::copy_preserving_metadata(&entry.source_path, &target).await?;
                Ok(FileOutcome::Copied { target, bytes })
            }
            (Action::ConvertImage, Some(target)) => {
                let written =
                    convert_heic_to_jpeg(self.decoder, &entry.source_path, &target, self.job.jpeg_quality)?;
                Ok(FileOutcome::Converted {
                    action: Action::ConvertImage,
                    target: written,
                })
            }
            (Action::ConvertVideo, Some(target)) => {
                self.transcode(entry, &target, observer)?;
                Ok(FileOutcome::Converted {
                    action: Action::ConvertVideo,
                    target,
                })
            }
            (Action::Skip, _) | (_, None) => Ok(FileOutcome::Skipped),
        }
    }

    fn transcode(&self, entry: &FileEntry, target: &Path, observer: &mut dyn ImportObserver) -> Result<(), ImportError> {
        let mode = TranscodeMode::from_verbose(self.job.verbose_transcode);

        observer.on_event(&ImportEvent::TranscodeStarted {
            file: entry.base_name.clone(),
            target: target.to_path_buf(),
            mode,
        });

        let result = self.transcoder.transcode(&entry.source_path, target, mode);

        observer.on_event(&ImportEvent::TranscodeFinished {
            file: entry.base_name.clone(),
            mode,
            success: result.is_ok(),
        });

        result.map(|_| ())
    }
}
