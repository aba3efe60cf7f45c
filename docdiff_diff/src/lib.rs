//! Diff and reconciliation engine for document review.
//!
//! This crate compares two extracted texts in one of two ways:
//! - lexically, with a deterministic line alignment refined to word level
//! - semantically, by chunking both texts and reconciling classifier output
//!   into one ordered change-block stream
//!
//! Primary entrypoints:
//! - [`LexicalComparator`] and [`SemanticComparator`] behind [`Comparator`]
//! - [`diff_lines`] and [`diff_words`] for the raw lexical engine
//! - [`reconcile`] for the chunk-pair reconciler
//! - [`format_summary_report`]
//!
//! # Example
//!
//! ```rust
//! use docdiff_diff::{Comparator, LexicalComparator};
//!
//! let comparator = LexicalComparator::default();
//! let result = comparator
//!     .compare("line one\nline two\n", "line one\nline TWO\n")
//!     .expect("compare");
//! assert!(result.has_changes());
//! assert!(result.markup.contains("diff-modified"));
//! ```

mod align;
mod compare;
mod engine;
mod error;
mod model;
mod reconcile;
mod render;
mod report;
mod util;
mod words;

pub use align::compute_opcodes;
pub use compare::{
    Comparator, DEFAULT_CALL_DELAY_MS, DEFAULT_MODEL_ID, LexicalComparator, SemanticComparator,
    SemanticOptions, compare_sources,
};
pub use engine::diff_lines;
pub use error::{CompareError, DocumentSide, ErrorKind, OracleError};
pub use model::{
    BlockSummary, ChangeBlock, ChangeStatus, Comparison, ComparisonDetail, ComparisonMode,
    Finding, FindingLevel, LexicalDiff, LineChange, LineSummary, OpSpan, OpTag, Opcode,
    SemanticDiff, WordSegment, WordTag,
};
pub use reconcile::{
    ChangeClassifier, DEFAULT_CALL_DELAY, ReconcileOptions, Reconciliation, reconcile,
    summarize_blocks,
};
pub use render::{escape_markup, linkify, render_lexical_markup, render_semantic_markup};
pub use report::format_summary_report;
pub use words::{WordAlignment, align_words, diff_words, tokenize_words};

#[cfg(test)]
mod tests;
