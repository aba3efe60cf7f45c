use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CompareError, OracleError};
use crate::model::{BlockSummary, ChangeBlock, ChangeStatus, Finding, FindingLevel, OpTag};
use crate::util::{char_len, is_blank};
use crate::words::align_words;

/// Default pause between consecutive classifier calls.
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_millis(100);

/// External service that splits a pair of texts into classified blocks.
///
/// Implementations must return blocks that, concatenated, rebuild `text_a`
/// from the `text_a` fields and `text_b` from the `text_b` fields.
pub trait ChangeClassifier {
    fn classify(&self, text_a: &str, text_b: &str) -> Result<Vec<ChangeBlock>, OracleError>;
}

impl<F> ChangeClassifier for F
where
    F: Fn(&str, &str) -> Result<Vec<ChangeBlock>, OracleError>,
{
    fn classify(&self, text_a: &str, text_b: &str) -> Result<Vec<ChangeBlock>, OracleError> {
        self(text_a, text_b)
    }
}

/// Options for one reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Pause inserted before every classifier call except the first.
    pub call_delay: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            call_delay: DEFAULT_CALL_DELAY,
        }
    }
}

/// Ordered block stream for a pair of chunked documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub blocks: Vec<ChangeBlock>,
    pub summary: BlockSummary,
    pub warnings: Vec<Finding>,
    pub oracle_calls: usize,
}

/// Pair chunks by index and turn every pair into classified blocks.
///
/// Pairs that are blank, one-sided, or identical are resolved locally.
/// Everything else goes to `classifier`, one call at a time and strictly in
/// index order. The first classifier failure aborts the run and no partial
/// block list is returned.
pub fn reconcile<C>(
    chunks_a: &[String],
    chunks_b: &[String],
    classifier: &C,
    options: &ReconcileOptions,
) -> Result<Reconciliation, CompareError>
where
    C: ChangeClassifier + ?Sized,
{
    let pairs = chunks_a.len().max(chunks_b.len());
    let mut blocks = Vec::new();
    let mut warnings = Vec::new();
    let mut oracle_calls = 0usize;

    for pair in 0..pairs {
        let chunk_a = chunks_a.get(pair).map(String::as_str).unwrap_or("");
        let chunk_b = chunks_b.get(pair).map(String::as_str).unwrap_or("");

        match (is_blank(chunk_a), is_blank(chunk_b)) {
            (true, true) => {
                debug!(pair, "skipping empty chunk pair");
                continue;
            }
            (true, false) => {
                debug!(pair, "chunk added, no classifier call");
                blocks.push(ChangeBlock::added(chunk_b));
                continue;
            }
            (false, true) => {
                debug!(pair, "chunk deleted, no classifier call");
                blocks.push(ChangeBlock::deleted(chunk_a));
                continue;
            }
            (false, false) => {}
        }

        if chunk_a == chunk_b {
            debug!(pair, "chunk unchanged, no classifier call");
            blocks.push(ChangeBlock::equal(chunk_a));
            continue;
        }

        if oracle_calls > 0 && !options.call_delay.is_zero() {
            thread::sleep(options.call_delay);
        }
        oracle_calls += 1;
        debug!(pair, call = oracle_calls, "classifying chunk pair");

        let returned = classifier
            .classify(chunk_a, chunk_b)
            .map_err(|source| CompareError::Oracle { pair, source })?;
        debug!(pair, blocks = returned.len(), "chunk pair classified");

        for block in returned {
            let index = blocks.len();
            blocks.push(sanitize_block(block, index, &mut warnings));
        }
    }

    let summary = summarize_blocks(&blocks);
    Ok(Reconciliation {
        blocks,
        summary,
        warnings,
        oracle_calls,
    })
}

/// Force status-consistent text fields and record anything suspicious.
fn sanitize_block(mut block: ChangeBlock, index: usize, warnings: &mut Vec<Finding>) -> ChangeBlock {
    match block.status {
        ChangeStatus::Deleted if !block.text_b.is_empty() => {
            warn!(block = index, "deleted block carried revised text, clearing it");
            block.text_b.clear();
            warnings.push(warning(
                "corrected_deleted_text",
                "deleted block carried revised text; revised text cleared",
                index,
            ));
        }
        ChangeStatus::Added if !block.text_a.is_empty() => {
            warn!(block = index, "added block carried original text, clearing it");
            block.text_a.clear();
            warnings.push(warning(
                "corrected_added_text",
                "added block carried original text; original text cleared",
                index,
            ));
        }
        ChangeStatus::Modified if block.text_a.is_empty() || block.text_b.is_empty() => {
            warn!(block = index, "modified block has an empty side");
            warnings.push(warning(
                "modified_missing_side",
                "modified block has an empty original or revised text",
                index,
            ));
        }
        ChangeStatus::Equal if block.text_a != block.text_b => {
            warn!(block = index, "equal block texts differ");
            warnings.push(warning(
                "equal_text_mismatch",
                "equal block has different original and revised text",
                index,
            ));
        }
        _ => {}
    }
    block
}

fn warning(code: &str, message: &str, index: usize) -> Finding {
    Finding {
        code: code.to_string(),
        level: FindingLevel::Warning,
        message: message.to_string(),
        block: Some(index),
    }
}

/// Derive character counters from a block list.
///
/// Added and deleted blocks count their whole text. Modified blocks count
/// only the word tokens that a word-level diff reports as inserted, deleted,
/// or replaced, plus the gross length of their revised text.
pub fn summarize_blocks(blocks: &[ChangeBlock]) -> BlockSummary {
    let mut summary = BlockSummary::default();

    for block in blocks {
        match block.status {
            ChangeStatus::Equal => {}
            ChangeStatus::Added => summary.added_chars += char_len(&block.text_b),
            ChangeStatus::Deleted => summary.deleted_chars += char_len(&block.text_a),
            ChangeStatus::Modified => {
                summary.modified_blocks += 1;
                summary.modified_chars += char_len(&block.text_b);

                let alignment = align_words(&block.text_a, &block.text_b);
                for op in &alignment.opcodes {
                    let deleted = char_len(&alignment.text_a(op));
                    let added = char_len(&alignment.text_b(op));
                    match op.tag {
                        OpTag::Equal => {}
                        OpTag::Insert => summary.added_chars += added,
                        OpTag::Delete => summary.deleted_chars += deleted,
                        OpTag::Replace => {
                            summary.added_chars += added;
                            summary.deleted_chars += deleted;
                        }
                    }
                }
            }
        }
    }

    summary
}
