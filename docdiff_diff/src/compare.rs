use std::time::Duration;

use docdiff_text::{
    Cl100kTokenizer, DEFAULT_MAX_CHUNK_TOKENS, ExtractionError, MIN_CHUNK_TOKENS, NormalizeOptions,
    TokenChunker, Tokenizer, normalize,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::diff_lines;
use crate::error::{CompareError, DocumentSide};
use crate::model::{
    ChangeStatus, Comparison, ComparisonDetail, ComparisonMode, LexicalDiff, SemanticDiff,
};
use crate::reconcile::{ChangeClassifier, ReconcileOptions, reconcile};
use crate::render::{render_lexical_markup, render_semantic_markup};
use crate::util::is_blank;

pub const DEFAULT_MODEL_ID: &str = "llama3-8b-8192";
pub const DEFAULT_CALL_DELAY_MS: u64 = 100;

/// A comparison strategy over two already extracted texts.
pub trait Comparator {
    fn mode(&self) -> ComparisonMode;
    fn compare(&self, text_a: &str, text_b: &str) -> Result<Comparison, CompareError>;
}

/// Run `comparator` over two extractor results.
///
/// Extraction failures are reported before any diff work, original side first.
pub fn compare_sources<C>(
    comparator: &C,
    source_a: Result<String, ExtractionError>,
    source_b: Result<String, ExtractionError>,
) -> Result<Comparison, CompareError>
where
    C: Comparator + ?Sized,
{
    let text_a = source_a.map_err(|source| CompareError::Extraction {
        side: DocumentSide::Original,
        source,
    })?;
    let text_b = source_b.map_err(|source| CompareError::Extraction {
        side: DocumentSide::Revised,
        source,
    })?;
    comparator.compare(&text_a, &text_b)
}

/// Deterministic line and word diff over normalized text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicalComparator {
    pub options: NormalizeOptions,
}

impl LexicalComparator {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }
}

impl Comparator for LexicalComparator {
    fn mode(&self) -> ComparisonMode {
        ComparisonMode::Lexical
    }

    fn compare(&self, text_a: &str, text_b: &str) -> Result<Comparison, CompareError> {
        let is_identical_raw = text_a == text_b;
        if is_identical_raw && !self.options.any_enabled() {
            debug!("raw texts equal, skipping lexical diff");
            return Ok(identical(ComparisonMode::Lexical, true));
        }

        let lines_a = normalized_lines(text_a, &self.options, DocumentSide::Original)?;
        let lines_b = normalized_lines(text_b, &self.options, DocumentSide::Revised)?;

        if lines_a == lines_b {
            info!(lines = lines_a.len(), "documents identical after normalization");
            return Ok(identical(ComparisonMode::Lexical, is_identical_raw));
        }

        let diff = diff_lines(&lines_a, &lines_b);
        let markup = render_lexical_markup(&diff)?;
        info!(
            lines_added = diff.summary.lines_added,
            lines_deleted = diff.summary.lines_deleted,
            lines_modified = diff.summary.lines_modified,
            "lexical comparison complete"
        );

        Ok(Comparison {
            mode: ComparisonMode::Lexical,
            is_identical: false,
            is_identical_raw,
            markup,
            detail: ComparisonDetail::Lexical(diff),
        })
    }
}

fn normalized_lines(
    raw: &str,
    options: &NormalizeOptions,
    side: DocumentSide,
) -> Result<Vec<String>, CompareError> {
    let lines = normalize(raw, options);
    if lines.is_empty() && !is_blank(raw) {
        return Err(CompareError::Preprocessing(format!(
            "document {side} has text but nothing left after normalization"
        )));
    }
    Ok(lines)
}

/// Settings for semantic comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticOptions {
    /// Per-chunk token budget; values under the floor are raised to it.
    pub max_chunk_tokens: usize,
    pub model_id: String,
    pub call_delay_ms: u64,
}

impl Default for SemanticOptions {
    fn default() -> Self {
        Self {
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            model_id: DEFAULT_MODEL_ID.to_string(),
            call_delay_ms: DEFAULT_CALL_DELAY_MS,
        }
    }
}

impl SemanticOptions {
    /// Token budget actually applied to chunks.
    pub fn effective_max_chunk_tokens(&self) -> usize {
        self.max_chunk_tokens.max(MIN_CHUNK_TOKENS)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            call_delay: Duration::from_millis(self.call_delay_ms),
        }
    }
}

/// Chunked comparison delegated to a change classifier.
pub struct SemanticComparator<O> {
    options: SemanticOptions,
    oracle: O,
    tokenizer: Box<dyn Tokenizer>,
}

impl<O: ChangeClassifier> SemanticComparator<O> {
    /// Build a comparator with the cl100k tokenizer.
    pub fn new(options: SemanticOptions, oracle: O) -> Result<Self, CompareError> {
        let tokenizer = Cl100kTokenizer::new()
            .map_err(|err| CompareError::Preprocessing(err.to_string()))?;
        Ok(Self::with_tokenizer(options, oracle, Box::new(tokenizer)))
    }

    pub fn with_tokenizer(options: SemanticOptions, oracle: O, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            options,
            oracle,
            tokenizer,
        }
    }

    pub fn options(&self) -> &SemanticOptions {
        &self.options
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O: ChangeClassifier> Comparator for SemanticComparator<O> {
    fn mode(&self) -> ComparisonMode {
        ComparisonMode::Semantic
    }

    fn compare(&self, text_a: &str, text_b: &str) -> Result<Comparison, CompareError> {
        if text_a == text_b {
            debug!("raw texts equal, skipping semantic diff");
            return Ok(identical(ComparisonMode::Semantic, true));
        }
        if is_blank(text_a) && is_blank(text_b) {
            debug!("both documents blank, skipping semantic diff");
            return Ok(identical(ComparisonMode::Semantic, false));
        }

        let chunker = TokenChunker::new(
            self.tokenizer.as_ref(),
            self.options.effective_max_chunk_tokens(),
        );
        let chunks_a = chunker.chunk(text_a);
        let chunks_b = chunker.chunk(text_b);
        debug!(
            chunks_a = chunks_a.len(),
            chunks_b = chunks_b.len(),
            max_tokens = chunker.max_tokens(),
            "chunked documents"
        );
        if chunks_a.is_empty() && chunks_b.is_empty() {
            return Ok(identical(ComparisonMode::Semantic, false));
        }

        let outcome = reconcile(
            &chunks_a,
            &chunks_b,
            &self.oracle,
            &self.options.reconcile_options(),
        )?;
        let markup = render_semantic_markup(&outcome.blocks)?;
        let is_identical = outcome
            .blocks
            .iter()
            .all(|block| block.status == ChangeStatus::Equal);
        info!(
            blocks = outcome.blocks.len(),
            oracle_calls = outcome.oracle_calls,
            warnings = outcome.warnings.len(),
            added_chars = outcome.summary.added_chars,
            deleted_chars = outcome.summary.deleted_chars,
            modified_blocks = outcome.summary.modified_blocks,
            "semantic comparison complete"
        );

        Ok(Comparison {
            mode: ComparisonMode::Semantic,
            is_identical,
            is_identical_raw: false,
            markup,
            detail: ComparisonDetail::Semantic(SemanticDiff {
                model_id: self.options.model_id.clone(),
                blocks: outcome.blocks,
                summary: outcome.summary,
                warnings: outcome.warnings,
                oracle_calls: outcome.oracle_calls,
            }),
        })
    }
}

fn identical(mode: ComparisonMode, is_identical_raw: bool) -> Comparison {
    let detail = match mode {
        ComparisonMode::Lexical => ComparisonDetail::Lexical(LexicalDiff::default()),
        ComparisonMode::Semantic => ComparisonDetail::Semantic(SemanticDiff::default()),
    };
    Comparison {
        mode,
        is_identical: true,
        is_identical_raw,
        markup: String::new(),
        detail,
    }
}
