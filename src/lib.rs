//! Concatenate JSON array fragment files into a single JSON array file.

pub mod fragment;
pub mod merge;

pub use merge::{merge, merge_with_progress, resolve_fragments, MergeMode, MergeOptions, MergeSummary};
