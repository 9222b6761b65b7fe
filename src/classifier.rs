//! # File Classifier
//!
//! Maps a discovered file to exactly one [`Action`] and, unless skipped, to the
//! single path it will occupy in the target directory.
//!
//! Rules, matched on the lowercased extension in this order:
//!
//! | Extension      | Flags                         | Action        | Target name            |
//! |----------------|-------------------------------|---------------|------------------------|
//! | `jpg` / `jpeg` | any                           | Copy          | whole name lowercased  |
//! | `heic`         | `keep_heic`                   | Copy          | unchanged              |
//! | `heic`         | otherwise                     | ConvertImage  | stem + `.jpg`          |
//! | `mov`          | `include_videos`, `keep_mov`  | Copy          | unchanged              |
//! | `mov`          | `include_videos`              | ConvertVideo  | stem + `.mp4`          |
//! | `png`          | `include_png`                 | Copy          | unchanged              |
//! | anything else  |                               | Skip          |                        |
//!
//! Classification never opens the file: a renamed file is treated according
//! to its name alone.

use crate::config::ImportJob;
use crate::file_manager::FileEntry;
use std::fmt;
use std::path::PathBuf;

/// What to do with a single source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Copy,
    /// HEIC → JPEG
    ConvertImage,
    /// MOV → MP4
    ConvertVideo,
    Skip,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Copy => "copy",
            Self::ConvertImage => "convert-image",
            Self::ConvertVideo => "convert-video",
            Self::Skip => "skip",
        };
        f.write_str(name)
    }
}

/// Result of classifying one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub action: Action,
    /// `None` only for [`Action::Skip`]
    pub target: Option<PathBuf>,
}

impl Classification {
    fn skip() -> Self {
        Self {
            action: Action::Skip,
            target: None,
        }
    }

    fn to(action: Action, target: PathBuf) -> Self {
        Self {
            action,
            target: Some(target),
        }
    }
}

/// Decide the action and target path for `entry` under the flags of `job`
pub fn classify(entry: &FileEntry, job: &ImportJob) -> Classification {
    let target_dir = &job.target_dir;

    match entry.extension.as_str() {
        "jpg" | "jpeg" => Classification::to(
            Action::Copy,
            target_dir.join(entry.lowercase_name()),
        ),
        "heic" if job.keep_heic => Classification::to(Action::Copy, target_dir.join(entry.file_name())),
        "heic" => Classification::to(
            Action::ConvertImage,
            target_dir.join(entry.with_extension("jpg")),
        ),
        "mov" if !job.include_videos => Classification::skip(),
        "mov" if job.keep_mov => Classification::to(Action::Copy, target_dir.join(entry.file_name())),
        "mov" => Classification::to(
            Action::ConvertVideo,
            target_dir.join(entry.with_extension("mp4")),
        ),
        "png" if job.include_png => Classification::to(Action::Copy, target_dir.join(entry.file_name())),
        _ => Classification::skip(),
    }
}
