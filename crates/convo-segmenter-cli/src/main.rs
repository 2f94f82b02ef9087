//! CLI for the conversation segmenter.
//!
//! Subcommands:
//!  - `batch`   : convert every `*.json` log in a directory into JSON-lines transcripts.
//!  - `convert` : convert a single log, writing to a file or stdout.
//!  - `config`  : print the effective configuration as TOML.
//!
//! Configuration comes from an optional TOML file (`--config`), with
//! individual flags overriding file values.
//!
//! Usage examples:
//!  cargo run -p convo-segmenter -- batch --input-dir input_jsons --output-dir output_jsons
//!  cargo run -p convo-segmenter -- convert --input chat.json > chat.jsonl

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;

use convo_segmenter::batch::{process_file, run_batch, BatchReport, FileOutcome, ProgressCallback};
use convo_segmenter::codec::encode_transcripts_jsonl;
use convo_segmenter::config::hours_to_seconds;
use convo_segmenter::utils::logging;
use convo_segmenter::{load_config, load_messages_json, BatchConfig, ConversationSegmenter};

/// CLI entrypoint.
#[derive(Parser)]
#[command(
    name = "convo-segmenter",
    about = "Convert exported chat logs into JSON-lines training transcripts",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every log in an input directory.
    Batch(BatchArgs),

    /// Convert a single log file.
    Convert(ConvertArgs),

    /// Print the effective configuration as TOML.
    Config(ConfigArgs),
}

/// Options shared by every subcommand that segments messages.
#[derive(Args, Debug, Clone)]
struct SegmentArgs {
    /// TOML configuration file; flags below override its values.
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maximum gap (hours) between consecutive messages of one exchange. Default: 2.0
    #[arg(long, value_name = "HOURS")]
    threshold_hours: Option<f64>,

    /// Separator placed between merged same-role messages. Default: ". "
    #[arg(long, value_name = "TEXT")]
    separator: Option<String>,
}

impl SegmentArgs {
    /// Load the config file (if any) and apply segmenter overrides.
    fn resolve(&self) -> Result<BatchConfig> {
        let mut cfg = match self.config.as_ref() {
            Some(path) => load_config(path)?,
            None => BatchConfig::default(),
        };
        if let Some(hours) = self.threshold_hours {
            if !(hours.is_finite() && hours >= 0.0) {
                bail!("--threshold-hours must be a non-negative number, got {}", hours);
            }
            cfg.segmenter.threshold_seconds = hours_to_seconds(hours);
        }
        if let Some(sep) = self.separator.as_ref() {
            cfg.segmenter.separator = sep.clone();
        }
        Ok(cfg)
    }
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
struct BatchArgs {
    #[command(flatten)]
    segment: SegmentArgs,

    /// Directory containing input JSON logs. Default: input_jsons
    #[arg(long, short = 'i', value_name = "PATH")]
    input_dir: Option<PathBuf>,

    /// Directory receiving JSON-lines outputs. Default: output_jsons
    #[arg(long, short = 'o', value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Prefix for output file names. Default: new-
    #[arg(long)]
    prefix: Option<String>,

    /// Output the batch report as JSON to stdout.
    #[arg(long)]
    json: bool,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
struct ConvertArgs {
    #[command(flatten)]
    segment: SegmentArgs,

    /// Input JSON log.
    #[arg(long, short = 'i', value_name = "PATH")]
    input: PathBuf,

    /// Output JSON-lines file (stdout if omitted).
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print segmentation statistics as JSON to stderr.
    #[arg(long)]
    stats: bool,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(flatten)]
    segment: SegmentArgs,
}

/// Application entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Batch(args) => run_batch_cmd(args),
        Commands::Convert(args) => run_convert(args),
        Commands::Config(args) => run_config(args),
    }
}

/// Run the `batch` subcommand.
///
/// Every file is attempted; the command fails at the end if any file failed.
fn run_batch_cmd(args: BatchArgs) -> Result<()> {
    let mut cfg = args.segment.resolve()?;
    if let Some(dir) = args.input_dir {
        cfg.input_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    if let Some(prefix) = args.prefix {
        cfg.output_prefix = prefix;
    }
    debug!(?cfg, "effective batch configuration");

    let (progress, finish) = progress_reporter(args.json);
    let report = run_batch(&cfg, progress)
        .with_context(|| format!("converting logs in {}", cfg.input_dir.display()))?;
    finish();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_batch_report(&report);
    }

    let failed = report.failed_count();
    if failed > 0 {
        bail!("{} of {} files failed", failed, report.outcomes.len());
    }
    Ok(())
}

fn print_batch_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        let name = outcome
            .input()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match outcome {
            FileOutcome::Processed(r) => {
                println!("Processed: {} → {}", name, r.output.display());
            }
            FileOutcome::Failed { error, .. } => {
                eprintln!("Failed: {}: {}", name, error);
            }
        }
    }
    if report.outcomes.is_empty() {
        println!("No input files found.");
    } else if report.failed_count() == 0 {
        println!(
            "All files processed successfully! ({} files, {} transcripts)",
            report.outcomes.len(),
            report.total_transcripts()
        );
    }
}

/// Build the optional progress callback and a closure that finalizes it.
#[cfg(feature = "progress")]
fn progress_reporter(quiet: bool) -> (Option<ProgressCallback>, Box<dyn FnOnce()>) {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::sync::Arc;

    if quiet {
        return (None, Box::new(|| {}));
    }

    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_message("Converting logs...");

    let cb: ProgressCallback = Arc::new({
        let bar = bar.clone();
        move |msg: String, fraction: f32| {
            bar.set_message(msg);
            bar.set_position((fraction * 100.0).floor() as u64);
        }
    });
    (Some(cb), Box::new(move || bar.finish_and_clear()))
}

#[cfg(not(feature = "progress"))]
fn progress_reporter(_quiet: bool) -> (Option<ProgressCallback>, Box<dyn FnOnce()>) {
    (None, Box::new(|| {}))
}

/// Run the `convert` subcommand.
///
/// With `--output`, a failed conversion leaves no file at that path.
fn run_convert(args: ConvertArgs) -> Result<()> {
    let cfg = args.segment.resolve()?;
    let segmenter = ConversationSegmenter::new(cfg.segmenter);

    let stats = match args.output.as_ref() {
        Some(path) => {
            let report = process_file(&args.input, path, &segmenter)?;
            eprintln!("Wrote {} transcripts to {}", report.stats.transcripts, path.display());
            report.stats
        }
        None => {
            let messages = load_messages_json(&args.input)
                .with_context(|| format!("loading {}", args.input.display()))?;
            let (transcripts, stats) = segmenter.process_with_stats(messages);
            let stdout = io::stdout();
            encode_transcripts_jsonl(stdout.lock(), &transcripts).context("writing to stdout")?;
            stats
        }
    };

    if args.stats {
        let mut stderr = io::stderr();
        writeln!(stderr, "{}", serde_json::to_string_pretty(&stats)?)?;
    }
    Ok(())
}

/// Run the `config` subcommand.
fn run_config(args: ConfigArgs) -> Result<()> {
    let cfg = args.segment.resolve()?;
    let text = toml::to_string_pretty(&cfg).context("serializing configuration")?;
    print!("{}", text);
    Ok(())
}
