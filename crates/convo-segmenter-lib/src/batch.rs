//! Directory-driven batch conversion.
//!
//! Each `*.json` log in the input directory is converted independently into
//! `<output_dir>/<prefix><file name>`. Files are processed in parallel; a
//! file that fails to decode or write leaves no output behind and does not
//! affect the others.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{load_messages_json, write_transcripts_jsonl};
use crate::config::BatchConfig;
use crate::pipeline::{ConversationSegmenter, SegmentStats};

/// Progress callback type for long-running operations.
/// The callback receives a message describing the current step and a progress fraction (0.0..1.0).
pub type ProgressCallback = Arc<dyn Fn(String, f32) + Send + Sync>;

/// Result of converting one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stats: SegmentStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Processed(FileReport),
    Failed { input: PathBuf, error: String },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Processed(r) => &r.input,
            FileOutcome::Failed { input, .. } => input,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FileOutcome::Processed(_))
    }
}

/// Per-file outcomes of a batch, in input file name order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn processed(&self) -> impl Iterator<Item = &FileReport> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Processed(r) => Some(r),
            FileOutcome::Failed { .. } => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    pub fn total_transcripts(&self) -> usize {
        self.processed().map(|r| r.stats.transcripts).sum()
    }
}

/// Output location for `input` under the batch configuration.
pub fn output_path_for(input: &Path, cfg: &BatchConfig) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    cfg.output_dir.join(format!("{}{}", cfg.output_prefix, name))
}

/// Convert a single log file.
///
/// On any failure (load, decode or write) nothing is left at `output`, not
/// even the result of an earlier successful run.
pub fn process_file(
    input: &Path,
    output: &Path,
    segmenter: &ConversationSegmenter,
) -> Result<FileReport> {
    let result = convert_file(input, output, segmenter);
    if result.is_err() {
        remove_stale_output(output);
    }
    result
}

fn convert_file(
    input: &Path,
    output: &Path,
    segmenter: &ConversationSegmenter,
) -> Result<FileReport> {
    let messages =
        load_messages_json(input).with_context(|| format!("loading {}", input.display()))?;
    let (transcripts, stats) = segmenter.process_with_stats(messages);
    write_transcripts_jsonl(output, &transcripts)
        .with_context(|| format!("writing {}", output.display()))?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        stats,
    })
}

fn remove_stale_output(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => debug!(path = %output.display(), "removed stale output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %output.display(), error = %e, "could not remove stale output"),
    }
}

/// List input logs: regular files in `dir` whose name ends in `.{extension}`,
/// sorted by name.
pub fn collect_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension);
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("reading {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every input log under `cfg.input_dir`.
///
/// Only an unreadable input directory or an uncreatable output directory
/// fails the whole batch; per-file errors are reported in the outcomes.
pub fn run_batch(cfg: &BatchConfig, progress: Option<ProgressCallback>) -> Result<BatchReport> {
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {}", cfg.output_dir.display()))?;
    let inputs = collect_inputs(&cfg.input_dir, &cfg.extension)?;
    info!(
        files = inputs.len(),
        input_dir = %cfg.input_dir.display(),
        "starting batch"
    );

    let segmenter = ConversationSegmenter::new(cfg.segmenter.clone());
    let total = inputs.len().max(1) as f32;
    let done = AtomicUsize::new(0);

    let outcomes: Vec<FileOutcome> = inputs
        .par_iter()
        .map(|input| {
            let output = output_path_for(input, cfg);
            let outcome = match process_file(input, &output, &segmenter) {
                Ok(report) => {
                    info!(
                        input = %input.display(),
                        transcripts = report.stats.transcripts,
                        "processed"
                    );
                    FileOutcome::Processed(report)
                }
                Err(err) => {
                    warn!(input = %input.display(), error = %format!("{err:#}"), "failed");
                    FileOutcome::Failed {
                        input: input.clone(),
                        error: format!("{err:#}"),
                    }
                }
            };
            let n = done.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(cb) = progress.as_ref() {
                let name = input
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                cb(name, n as f32 / total);
            }
            outcome
        })
        .collect();

    Ok(BatchReport { outcomes })
}
