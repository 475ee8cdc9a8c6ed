/*
cargo run --bin merge_evals

cargo run --bin merge_evals -- \
    --pattern "dev/GatorRater/evals/evaluations_*.json" \
    --output dev/GatorRater/evaluations.json \
    --mode parsed \
    --sort
*/

use std::fs::{create_dir_all, File};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

use evals_merge::merge::{DEFAULT_OUTPUT, DEFAULT_PATTERN};
use evals_merge::{merge_with_progress, MergeMode, MergeOptions};

/// Merge chunked evaluation JSON arrays into a single array file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Glob matching the fragment files
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Output file (created or truncated)
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// textual keeps the raw strip-and-join behaviour, parsed re-serialises each array
    #[arg(short, long, value_enum, default_value_t = MergeMode::Textual)]
    mode: MergeMode,

    /// Process fragments in sorted path order
    #[arg(long)]
    sort: bool,

    /// Directory for the run log
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging setup
    create_dir_all(&cli.log_dir)?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = cli.log_dir.join(format!("merge_evals_{ts}.log"));
    WriteLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        File::create(&log_path)?,
    )?;
    info!("Started - pattern: {:?}, output: {:?}", cli.pattern, cli.output);

    let opts = MergeOptions {
        pattern: cli.pattern,
        output: cli.output,
        mode: cli.mode,
        sort: cli.sort,
    };

    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} {pos}/{len} {wide_bar:.cyan/blue} {elapsed_precise}",
    )?);

    let summary = merge_with_progress(&opts, &bar)?;
    bar.finish_and_clear();

    match summary.elements {
        Some(n) => println!(
            "Merged {} fragment(s) ({n} elements) into {}",
            summary.fragments,
            opts.output.display()
        ),
        None => println!(
            "Merged {} fragment(s) into {}",
            summary.fragments,
            opts.output.display()
        ),
    }
    Ok(())
}
