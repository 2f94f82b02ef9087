/*
Segmenter and batch configuration.

Design notes:
- The grouping threshold is stored as whole seconds (u64) so it round-trips
  through TOML/JSON unchanged; `SegmenterConfig::threshold()` converts it to
  a `chrono::Duration` for gap comparisons.
- The default threshold is two hours. Older tooling documented twelve hours
  next to a two-hour constant; two hours is what actually ran.
- Every field has a serde default so a partial TOML file only overrides the
  keys it names.
*/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default maximum gap between consecutive messages of one exchange (2 hours).
pub const DEFAULT_THRESHOLD_SECONDS: u64 = 2 * 60 * 60;
/// Joiner placed between merged same-role contents.
pub const DEFAULT_SEPARATOR: &str = ". ";
pub const DEFAULT_INPUT_DIR: &str = "input_jsons";
pub const DEFAULT_OUTPUT_DIR: &str = "output_jsons";
pub const DEFAULT_OUTPUT_PREFIX: &str = "new-";
pub const DEFAULT_EXTENSION: &str = "json";

/// Upper bound for the threshold (~100 years); keeps the `Duration`
/// conversion far away from chrono's overflow limits.
const MAX_THRESHOLD_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// Convert hours -> seconds (as u64). Negative or NaN input maps to 0.
pub fn hours_to_seconds(hours: f64) -> u64 {
    let secs = (hours * 60.0 * 60.0).round();
    if secs.is_nan() || secs <= 0.0 {
        0
    } else {
        (secs as u64).min(MAX_THRESHOLD_SECONDS)
    }
}

/// Parameters of the segmentation and merge phases.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Largest allowed gap (seconds) between consecutive messages of a group.
    /// A gap exactly equal to the threshold keeps the group open.
    pub threshold_seconds: u64,
    /// Separator used when merging consecutive same-role messages.
    pub separator: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        SegmenterConfig {
            threshold_seconds: DEFAULT_THRESHOLD_SECONDS,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl SegmenterConfig {
    pub fn threshold(&self) -> Duration {
        Duration::seconds(self.threshold_seconds.min(MAX_THRESHOLD_SECONDS) as i64)
    }
}

/// Directory-driven batch configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory scanned (non-recursively) for input logs.
    pub input_dir: PathBuf,
    /// Directory receiving the JSON-lines outputs; created if missing.
    pub output_dir: PathBuf,
    /// Prefix prepended to each input file name to form its output name.
    pub output_prefix: String,
    /// Input file extension (without the dot) selecting which files to process.
    pub extension: String,
    pub segmenter: SegmenterConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            segmenter: SegmenterConfig::default(),
        }
    }
}

/// Load a `BatchConfig` from a TOML file. Keys absent from the file keep
/// their defaults.
pub fn load_config(path: &Path) -> Result<BatchConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let cfg: BatchConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(cfg)
}
