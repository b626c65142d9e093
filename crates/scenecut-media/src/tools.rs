//! Location of the external FFmpeg binaries.

use crate::error::{MediaError, MediaResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Optional explicit tool paths. Unset entries are looked up on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

/// Resolved ffmpeg and ffprobe executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl MediaTools {
    /// Resolve both binaries, preferring configured paths.
    pub fn resolve(config: &ToolsConfig) -> MediaResult<Self> {
        Ok(Self {
            ffmpeg: find_binary("ffmpeg", config.ffmpeg.as_deref())?,
            ffprobe: find_binary("ffprobe", config.ffprobe.as_deref())?,
        })
    }

    /// First line of `<tool> -version`, e.g. `ffmpeg version 6.1.1 ...`.
    pub fn version(tool: &Path) -> MediaResult<String> {
        let output = Command::new(tool)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MediaError::ExtractorFailed(format!("{}: {e}", tool.display())))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }
}

/// Find `name` on `PATH` unless an explicit path is given.
pub fn find_binary(name: &str, configured: Option<&Path>) -> MediaResult<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        // A bare command name is still looked up on PATH.
        return which::which(path).map_err(|_| MediaError::ToolNotFound {
            tool: path.display().to_string(),
        });
    }

    let found = which::which(name).map_err(|_| MediaError::ToolNotFound {
        tool: name.to_string(),
    })?;
    debug!(tool = name, path = %found.display(), "Resolved external tool");
    Ok(found)
}
