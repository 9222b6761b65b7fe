//! # Media Importer Main Orchestrator
//!
//! Orchestratore principale: crea la directory di destinazione, enumera i
//! file sorgente e li elabora uno alla volta.
//!
//! ## Stati:
//! 1. **Enumerating**: scansione ricorsiva completa della sorgente
//! 2. **Processing(i)**: classificazione e dispatch del file `i`
//! 3. **Done**: riepilogo finale
//!
//! ## Gestione errori:
//! - Directory di destinazione non creabile: errore fatale, nessun file toccato
//! - Errore su un singolo file: riportato agli observer e loggato, si passa
//!   al file successivo
//! - Il run termina con successo anche se alcuni file sono falliti

use crate::{
    config::ImportJob,
    file_manager::{FileEntry, FileManager},
    image_processor::{ExternalHeicDecoder, HeicDecoder},
    importer::{
        events::{FileOutcome, ImportEvent, ImportObserver},
        task_importer::TaskImporter,
    },
    progress::ImportStats,
    video_processor::{FfmpegTranscoder, VideoTranscoder},
};
use anyhow::Result;
use tracing::{debug, info};

/// Main import orchestrator
pub struct MediaImporter {
    job: ImportJob,
    decoder: Box<dyn HeicDecoder>,
    transcoder: Box<dyn VideoTranscoder>,
}

impl MediaImporter {
    /// Create an importer using the external HEIC tools and ffmpeg
    pub fn new(job: ImportJob) -> Result<Self> {
        job.validate()?;

        Ok(Self {
            job,
            decoder: Box::new(ExternalHeicDecoder::new()),
            transcoder: Box::new(FfmpegTranscoder::new()),
        })
    }

    pub fn with_decoder(mut self, decoder: impl HeicDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn with_transcoder(mut self, transcoder: impl VideoTranscoder + 'static) -> Self {
        self.transcoder = Box::new(transcoder);
        self
    }

    pub fn job(&self) -> &ImportJob {
        &self.job
    }

    /// Run the import process
    pub async fn run(&self, observer: &mut dyn ImportObserver) -> Result<ImportStats> {
        let job = &self.job;
        info!("Starting import from: {}", job.source_dir.display());
        self.log_mode();

        tokio::fs::create_dir_all(&job.target_dir).await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to create target directory {}: {}",
                job.target_dir.display(),
                e
            )
        })?;

        let files = FileManager::find_all_files(&job.source_dir);
        let total = files.len();
        info!("Found {} files to process", total);

        observer.on_event(&ImportEvent::Started {
            source_dir: job.source_dir.clone(),
            target_dir: job.target_dir.clone(),
            total_files: total,
        });

        let task = TaskImporter::new(job, self.decoder.as_ref(), self.transcoder.as_ref());
        let mut stats = ImportStats::new(total);

        for (index, path) in files.iter().enumerate() {
            let entry = FileEntry::from_path(path);

            let outcome = match task.process_file(&entry, observer).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!("Failed to process {}: {}", entry.base_name, e);
                    FileOutcome::Failed { message: e.to_string() }
                }
            };
            debug!("[{}/{}] {}: {:?}", index + 1, total, entry.base_name, outcome);

            stats.record(&outcome);
            observer.on_event(&ImportEvent::FileFinished {
                index,
                total,
                file: entry.base_name,
                outcome,
            });
        }

        observer.on_event(&ImportEvent::Completed { stats: stats.clone() });

        info!("=== Import Complete ===");
        info!("{}", stats.format_summary());

        Ok(stats)
    }

    fn log_mode(&self) {
        let job = &self.job;
        info!("📁 Target directory: {}", job.target_dir.display());

        if job.keep_heic {
            info!("🖼️ HEIC: copy unmodified");
        } else {
            info!("🖼️ HEIC: convert to JPEG (quality: {})", job.jpeg_quality);
        }

        if !job.include_videos {
            info!("🎬 Videos: ignored");
        } else if job.keep_mov {
            info!("🎬 Videos: copy MOV unmodified");
        } else {
            info!("🎬 Videos: transcode MOV to MP4");
        }

        if job.include_png {
            info!("🖼️ PNG: copy unmodified");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Action;
    use crate::error::ImportError;
    use crate::image_processor::tests::gradient;
    use crate::image_processor::RawImage;
    use crate::importer::events::{NullObserver, RecordingObserver};
    use crate::video_processor::TranscodeMode;
    use std::collections::BTreeSet;
    use std::path::{Path, PathBuf};
    use std::process::ExitStatus;
    use tempfile::TempDir;

    /// Decodes files whose content is "heic"; anything else is corrupt
    struct FakeDecoder;

    impl HeicDecoder for FakeDecoder {
        fn decode(&self, path: &Path) -> Result<RawImage, ImportError> {
            if std::fs::read(path)? == b"heic" {
                Ok(gradient(4, 3))
            } else {
                Err(ImportError::Decode(format!("{} is not a HEIF container", path.display())))
            }
        }
    }

    /// Writes a fixed payload to the output, or fails when told to
    struct FakeTranscoder {
        fail: bool,
    }

    impl VideoTranscoder for FakeTranscoder {
        fn transcode(&self, _input: &Path, output: &Path, _mode: TranscodeMode) -> Result<ExitStatus, ImportError> {
            if self.fail {
                return Err(ImportError::Transcode("ffmpeg exited with exit status: 1".to_string()));
            }
            std::fs::write(output, b"mp4")?;
            Ok(success_status())
        }
    }

    #[cfg(unix)]
    fn success_status() -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(0)
    }

    #[cfg(windows)]
    fn success_status() -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(0)
    }

    struct Fixture {
        _dir: TempDir,
        source: PathBuf,
        target: PathBuf,
    }

    impl Fixture {
        /// Source tree with a JPEG, a HEIC and a MOV in a camera-like layout
        fn camera_roll() -> Self {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join("DCIM");
            let target = dir.path().join("import");
            let roll = source.join("100APPLE");
            std::fs::create_dir_all(&roll).unwrap();
            std::fs::write(roll.join("IMG_001.JPG"), b"jpeg-bytes").unwrap();
            std::fs::write(roll.join("Photo.HEIC"), b"heic").unwrap();
            std::fs::write(roll.join("Clip.MOV"), b"mov-bytes").unwrap();
            Self { _dir: dir, source, target }
        }

        fn job(&self) -> ImportJob {
            ImportJob::new(&self.source, &self.target)
        }

        fn add(&self, relative: &str, content: &[u8]) {
            let path = self.source.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn target_names(&self) -> BTreeSet<String> {
            std::fs::read_dir(&self.target)
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        }
    }

    fn importer(job: ImportJob, fail_transcode: bool) -> MediaImporter {
        MediaImporter::new(job)
            .unwrap()
            .with_decoder(FakeDecoder)
            .with_transcoder(FakeTranscoder { fail: fail_transcode })
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_default_flags() {
        let fx = Fixture::camera_roll();
        let stats = importer(fx.job(), false).run(&mut NullObserver).await.unwrap();

        assert_eq!(fx.target_names(), names(&["img_001.jpg", "Photo.jpg"]));
        assert_eq!(std::fs::read(fx.target.join("img_001.jpg")).unwrap(), b"jpeg-bytes");
        assert!(image::open(fx.target.join("Photo.jpg")).is_ok());

        assert_eq!(stats.files_found, 3);
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_keep_mov_copies_video() {
        let fx = Fixture::camera_roll();
        let job = ImportJob {
            include_videos: true,
            keep_mov: true,
            ..fx.job()
        };
        importer(job, true).run(&mut NullObserver).await.unwrap();

        assert_eq!(fx.target_names(), names(&["img_001.jpg", "Photo.jpg", "Clip.MOV"]));
        assert_eq!(std::fs::read(fx.target.join("Clip.MOV")).unwrap(), b"mov-bytes");
    }

    #[tokio::test]
    async fn test_keep_heic_copies_unmodified() {
        let fx = Fixture::camera_roll();
        let job = ImportJob {
            keep_heic: true,
            ..fx.job()
        };
        importer(job, false).run(&mut NullObserver).await.unwrap();

        assert_eq!(fx.target_names(), names(&["img_001.jpg", "Photo.HEIC"]));
        assert_eq!(std::fs::read(fx.target.join("Photo.HEIC")).unwrap(), b"heic");
    }

    #[tokio::test]
    async fn test_videos_transcoded() {
        let fx = Fixture::camera_roll();
        let job = ImportJob {
            include_videos: true,
            ..fx.job()
        };
        let stats = importer(job, false).run(&mut NullObserver).await.unwrap();

        assert_eq!(fx.target_names(), names(&["img_001.jpg", "Photo.jpg", "Clip.mp4"]));
        assert_eq!(stats.converted, 2);
    }

    #[tokio::test]
    async fn test_transcode_failure_does_not_stop_run() {
        let fx = Fixture::camera_roll();
        // Sorted by name: "Clip.MOV" comes before the photos
        let job = ImportJob {
            include_videos: true,
            ..fx.job()
        };
        let mut observer = RecordingObserver::default();
        let stats = importer(job, true).run(&mut observer).await.unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(fx.target_names(), names(&["img_001.jpg", "Photo.jpg"]));

        let finished: Vec<_> = observer
            .events
            .iter()
            .filter_map(|e| match e {
                ImportEvent::FileFinished { file, outcome, .. } => Some((file.as_str(), outcome.is_failure())),
                _ => None,
            })
            .collect();
        assert_eq!(
            finished,
            vec![("Clip.MOV", true), ("IMG_001.JPG", false), ("Photo.HEIC", false)]
        );
    }

    #[tokio::test]
    async fn test_corrupt_heic_reported_and_others_imported() {
        let fx = Fixture::camera_roll();
        fx.add("100APPLE/Broken.HEIC", b"\x00\x01garbage");
        fx.add("101APPLE/IMG_002.jpeg", b"second");

        let mut observer = RecordingObserver::default();
        let stats = importer(fx.job(), false).run(&mut observer).await.unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(
            fx.target_names(),
            names(&["img_001.jpg", "Photo.jpg", "img_002.jpeg"])
        );

        let failures: Vec<_> = observer
            .events
            .iter()
            .filter_map(|e| match e {
                ImportEvent::FileFinished {
                    file,
                    outcome: FileOutcome::Failed { message },
                    ..
                } => Some((file.clone(), message.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "Broken.HEIC");
        assert!(failures[0].1.contains("HEIC decode error"));
    }

    #[tokio::test]
    async fn test_progress_events_once_per_file() {
        let fx = Fixture::camera_roll();
        fx.add("notes.txt", b"skip me");

        let mut observer = RecordingObserver::default();
        importer(fx.job(), false).run(&mut observer).await.unwrap();

        assert!(matches!(
            observer.events.first(),
            Some(ImportEvent::Started { total_files: 4, .. })
        ));
        assert!(matches!(observer.events.last(), Some(ImportEvent::Completed { .. })));

        let indices: Vec<usize> = observer
            .events
            .iter()
            .filter_map(|e| match e {
                ImportEvent::FileFinished { index, total: 4, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_jpeg_names_collide_last_wins() {
        let fx = Fixture::camera_roll();
        // "IMG_001.JPG" in 100APPLE is visited before this one
        fx.add("200APPLE/img_001.jpg", b"later");

        importer(fx.job(), false).run(&mut NullObserver).await.unwrap();

        assert_eq!(std::fs::read(fx.target.join("img_001.jpg")).unwrap(), b"later");
    }

    #[tokio::test]
    async fn test_run_twice_is_idempotent() {
        let fx = Fixture::camera_roll();
        let job = ImportJob {
            include_videos: true,
            ..fx.job()
        };
        let importer = importer(job, false);

        importer.run(&mut NullObserver).await.unwrap();
        let first: Vec<(String, Vec<u8>)> = fx
            .target_names()
            .into_iter()
            .map(|n| {
                let bytes = std::fs::read(fx.target.join(&n)).unwrap();
                (n, bytes)
            })
            .collect();

        importer.run(&mut NullObserver).await.unwrap();
        let second: Vec<(String, Vec<u8>)> = fx
            .target_names()
            .into_iter()
            .map(|n| {
                let bytes = std::fs::read(fx.target.join(&n)).unwrap();
                (n, bytes)
            })
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_target_directory_created() {
        let fx = Fixture::camera_roll();
        let job = ImportJob::new(&fx.source, fx.target.join("nested").join("deeper"));
        let target = job.target_dir.clone();

        importer(job, false).run(&mut NullObserver).await.unwrap();
        assert!(target.join("img_001.jpg").is_file());
    }

    #[tokio::test]
    async fn test_target_creation_failure_is_fatal() {
        let fx = Fixture::camera_roll();
        let blocker = fx._dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let job = ImportJob::new(&fx.source, blocker.join("sub"));
        let mut observer = RecordingObserver::default();
        let result = importer(job, false).run(&mut observer).await;

        assert!(result.is_err());
        assert!(observer.events.is_empty());
    }

    #[tokio::test]
    async fn test_empty_source() {
        let dir = TempDir::new().unwrap();
        let job = ImportJob::new(dir.path(), dir.path().join("out"));

        let stats = importer(job, false).run(&mut NullObserver).await.unwrap();
        assert_eq!(stats, ImportStats::default());
    }

    #[test]
    fn test_new_rejects_invalid_job() {
        let dir = TempDir::new().unwrap();
        let job = ImportJob::new(dir.path().join("missing"), dir.path().join("out"));
        assert!(MediaImporter::new(job).is_err());
    }

    #[tokio::test]
    async fn test_png_opt_in() {
        let fx = Fixture::camera_roll();
        fx.add("100APPLE/Screen.PNG", b"png");

        let job = ImportJob {
            include_png: true,
            ..fx.job()
        };
        let mut observer = RecordingObserver::default();
        importer(job, false).run(&mut observer).await.unwrap();

        assert_eq!(std::fs::read(fx.target.join("Screen.PNG")).unwrap(), b"png");
        assert!(observer.events.iter().any(|e| matches!(
            e,
            ImportEvent::FileFinished {
                file,
                outcome: FileOutcome::Copied { .. },
                ..
            } if file == "Screen.PNG"
        )));
        assert!(observer.events.iter().any(|e| matches!(
            e,
            ImportEvent::FileFinished {
                outcome: FileOutcome::Converted { action: Action::ConvertImage, .. },
                ..
            }
        )));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_names_do_not_collide() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let fx = Fixture::camera_roll();
        std::fs::write(fx.source.join(OsStr::from_bytes(b"a\xff.jpg")), b"first").unwrap();
        std::fs::write(fx.source.join(OsStr::from_bytes(b"a\xfe.jpg")), b"second").unwrap();

        let stats = importer(fx.job(), false).run(&mut NullObserver).await.unwrap();
        assert_eq!(stats.copied, 3);
        assert_eq!(stats.failed, 0);

        assert_eq!(
            std::fs::read(fx.target.join(OsStr::from_bytes(b"a\xff.jpg"))).unwrap(),
            b"first"
        );
        assert_eq!(
            std::fs::read(fx.target.join(OsStr::from_bytes(b"a\xfe.jpg"))).unwrap(),
            b"second"
        );
        assert_eq!(std::fs::read_dir(&fx.target).unwrap().count(), 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_linked_photo_is_imported() {
        let fx = Fixture::camera_roll();
        let elsewhere = fx._dir.path().join("real.JPG");
        std::fs::write(&elsewhere, b"linked-jpeg").unwrap();
        std::os::unix::fs::symlink(&elsewhere, fx.source.join("LINK.JPG")).unwrap();

        let stats = importer(fx.job(), false).run(&mut NullObserver).await.unwrap();

        assert_eq!(stats.files_found, 4);
        assert_eq!(stats.copied, 2);
        assert_eq!(std::fs::read(fx.target.join("link.jpg")).unwrap(), b"linked-jpeg");
    }
}
