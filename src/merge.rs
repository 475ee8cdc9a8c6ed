//! Fragment discovery and the merge into one output array.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::fragment::{parse_elements, textual_body};

pub const DEFAULT_PATTERN: &str = "./evals/evaluations_*.json";
pub const DEFAULT_OUTPUT: &str = "./evaluations.json";

/// How fragment interiors are extracted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MergeMode {
    /// Strip whitespace and outer brackets as plain text; no validation.
    #[default]
    Textual,
    /// Parse every fragment as a JSON array and re-serialise its elements.
    Parsed,
}

#[derive(Clone, Debug)]
pub struct MergeOptions {
    pub pattern: String,
    pub output: PathBuf,
    pub mode: MergeMode,
    /// Sort and de-duplicate matched paths instead of keeping glob order.
    pub sort: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            mode: MergeMode::default(),
            sort: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeSummary {
    pub fragments: usize,
    /// Only counted in `Parsed` mode.
    pub elements: Option<usize>,
    pub bytes_written: u64,
}

/// Enumerate the files matching `pattern`.
pub fn resolve_fragments(pattern: &str, sort: bool) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

    let mut files = Vec::new();
    for entry in paths {
        files.push(entry.with_context(|| format!("Error resolving pattern: {pattern}"))?);
    }

    if sort {
        files.sort();
        files.dedup();
    }
    Ok(files)
}

pub fn merge(opts: &MergeOptions) -> Result<MergeSummary> {
    merge_with_progress(opts, &ProgressBar::hidden())
}

/// Write every fragment matching `opts.pattern` into `opts.output` as one
/// JSON array. An error leaves whatever was written so far on disk.
pub fn merge_with_progress(opts: &MergeOptions, bar: &ProgressBar) -> Result<MergeSummary> {
    let file = File::create(&opts.output)
        .with_context(|| format!("creating {}", opts.output.display()))?;
    let mut out = BufWriter::new(file);

    let paths = resolve_fragments(&opts.pattern, opts.sort)?;
    if paths.is_empty() {
        warn!("No files match {}", opts.pattern);
    }
    info!("Merging {} fragment(s) into {:?} ({:?} mode)", paths.len(), opts.output, opts.mode);
    bar.set_length(paths.len() as u64);

    let mut sink = Sink { out: &mut out, path: &opts.output, written: 0 };
    let mut elements = 0usize;

    sink.put("[")?;
    for (idx, path) in paths.iter().enumerate() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;

        match opts.mode {
            MergeMode::Textual => {
                let body = textual_body(&raw);
                if body.is_empty() {
                    warn!("Fragment {} has an empty body", path.display());
                }
                if idx > 0 {
                    sink.put(",")?;
                }
                sink.put(&body)?;
            }
            MergeMode::Parsed => {
                let items = parse_elements(&raw, path)?;
                for item in &items {
                    if elements > 0 {
                        sink.put(",")?;
                    }
                    sink.put(&serde_json::to_string(item)?)?;
                    elements += 1;
                }
            }
        }

        debug!("Appended {}", path.display());
        bar.inc(1);
    }
    sink.put("]")?;

    let written = sink.written;
    out.flush()
        .with_context(|| format!("writing {}", opts.output.display()))?;

    let summary = MergeSummary {
        fragments: paths.len(),
        elements: (opts.mode == MergeMode::Parsed).then_some(elements),
        bytes_written: written,
    };
    info!("Done - {:?}", summary);
    Ok(summary)
}

// Output writer that tags errors with the output path and counts bytes.
struct Sink<'a, W: Write> {
    out: &'a mut W,
    path: &'a Path,
    written: u64,
}

impl<W: Write> Sink<'_, W> {
    fn put(&mut self, s: &str) -> Result<()> {
        self.out
            .write_all(s.as_bytes())
            .with_context(|| format!("writing {}", self.path.display()))?;
        self.written += s.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_hardcoded_paths() {
        let opts = MergeOptions::default();
        assert_eq!(opts.pattern, "./evals/evaluations_*.json");
        assert_eq!(opts.output, PathBuf::from("./evaluations.json"));
        assert_eq!(opts.mode, MergeMode::Textual);
        assert!(!opts.sort);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = resolve_fragments("evals_[.json", false).unwrap_err();
        assert!(err.to_string().contains("Invalid glob pattern"));
    }

    #[test]
    fn sink_counts_bytes() {
        let mut buf = Vec::new();
        let mut sink = Sink { out: &mut buf, path: Path::new("mem"), written: 0 };
        sink.put("[").unwrap();
        sink.put("1,2").unwrap();
        sink.put("]").unwrap();
        assert_eq!(sink.written, 5);
        assert_eq!(buf, b"[1,2]");
    }
}
