//! Application configuration.
//!
//! Built once at startup from an optional JSON file, then adjusted by CLI
//! flags, and passed down to every stage.

use anyhow::{Context, Result};
use scenecut_detect::DetectorConfig;
use scenecut_media::{ExtractConfig, ExtractionMode, PollPolicy, ToolsConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{DetectArgs, RunOptions};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub extract: ExtractConfig,
    pub detector: DetectorConfig,
    pub poll: PollPolicy,
    /// Parent of the per-run scratch directory; system temp dir when unset.
    pub scratch_root: Option<PathBuf>,
    /// Frames decoded ahead of detection; 0 reads on the calling thread.
    pub prefetch_depth: usize,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tools: ToolsConfig::default(),
            extract: ExtractConfig::default(),
            detector: DetectorConfig::default(),
            poll: PollPolicy::default(),
            scratch_root: None,
            prefetch_depth: 2,
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// `<config dir>/scenecut/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scenecut").join("config.json"))
    }

    /// Load `path` if given (it must exist), else the default file if it
    /// exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Apply flags shared by `detect` and `scan`.
    pub fn apply_run_options(&mut self, options: &RunOptions) {
        if let Some(threshold) = options.threshold {
            self.detector.threshold = threshold;
        }
        if let Some(distance) = options.min_cut_distance {
            self.detector.min_cut_distance = distance;
        }
        if options.no_prefetch {
            self.prefetch_depth = 0;
        }
    }

    /// Apply `detect` flags.
    pub fn apply_detect_args(&mut self, args: &DetectArgs) {
        self.apply_run_options(&args.run);
        if args.blocking {
            self.extract.mode = ExtractionMode::Blocking;
        }
        if let Some(downscale) = args.downscale {
            self.extract.downscale = downscale.max(1);
        }
        if let Some(root) = &args.scratch_root {
            self.scratch_root = Some(root.clone());
        }
    }
}
