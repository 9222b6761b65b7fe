//! # Tool Path Resolver
//!
//! Finds the external binaries the importer shells out to:
//! - `ffmpeg` for MOV → MP4
//! - `heif-dec`, `heif-convert`, `magick` or `sips` for HEIC decoding
//!
//! Lookup order: an explicit path (anything containing a separator), the
//! `TOOLS_DIR` override directory, then the system `PATH`.

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tool path resolver
#[derive(Debug, Clone, Default)]
pub struct ToolPathResolver {
    /// Extra directory searched before `PATH`
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a new path resolver, honouring the `TOOLS_DIR` environment variable
    pub fn new() -> Self {
        let tools_dir = env::var_os("TOOLS_DIR")
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir());

        if let Some(ref dir) = tools_dir {
            debug!("Using tools directory from TOOLS_DIR: {}", dir.display());
        }

        Self { tools_dir }
    }

    /// Resolver that searches `dir` before `PATH`
    pub fn with_tools_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: Some(dir.into()),
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let as_path = Path::new(tool_name);
        if as_path.components().count() > 1 {
            return as_path.is_file().then(|| as_path.to_path_buf());
        }

        let file_name = Self::executable_name(tool_name);

        if let Some(ref dir) = self.tools_dir {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                debug!("Using bundled tool: {} -> {}", tool_name, candidate.display());
                return Some(candidate);
            }
        }

        let found = env::var_os("PATH").and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join(&file_name))
                .find(|candidate| candidate.is_file())
        });

        match found {
            Some(ref path) => debug!("Using system tool: {} -> {}", tool_name, path.display()),
            None => debug!("Tool not found: {}", tool_name),
        }

        found
    }

    /// Every tool of `candidates` that can be found, in order of preference
    pub fn available_tools<'a>(&self, candidates: &[&'a str]) -> Vec<(&'a str, PathBuf)> {
        candidates
            .iter()
            .filter_map(|&tool| self.resolve_tool(tool).map(|path| (tool, path)))
            .collect()
    }

    fn executable_name(tool_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", tool_name)
        } else {
            tool_name.to_string()
        }
    }

    /// Installation hint for a missing tool on the current platform
    pub fn install_hint(tool_name: &str) -> String {
        if cfg!(target_os = "macos") {
            match tool_name {
                "ffmpeg" => "brew install ffmpeg".to_string(),
                "heif-dec" | "heif-convert" => "brew install libheif".to_string(),
                "magick" => "brew install imagemagick".to_string(),
                "sips" => "sips ships with macOS".to_string(),
                _ => format!("brew install {}", tool_name),
            }
        } else if cfg!(target_os = "linux") {
            match tool_name {
                "ffmpeg" => "sudo apt-get install ffmpeg".to_string(),
                "heif-dec" | "heif-convert" => "sudo apt-get install libheif-examples".to_string(),
                "magick" => "sudo apt-get install imagemagick".to_string(),
                _ => format!("sudo apt-get install {}", tool_name),
            }
        } else {
            format!("install {} and make sure it is on PATH", tool_name)
        }
    }

    /// Error message for a tool that could not be found
    pub fn missing_tool_message(tool_name: &str) -> String {
        format!(
            "'{}' not found on PATH (install with: {})",
            tool_name,
            Self::install_hint(tool_name)
        )
    }
}
