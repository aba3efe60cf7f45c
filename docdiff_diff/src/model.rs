use serde::{Deserialize, Serialize};

/// Alignment tag for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// Half-open index range `[start, end)` into one side of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpSpan {
    pub start: usize,
    pub end: usize,
}

impl OpSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One step of an alignment between sequence `a` and sequence `b`.
///
/// The opcodes of an alignment partition both sequences: spans are
/// contiguous, in order, and cover every element exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    pub tag: OpTag,
    pub a: OpSpan,
    pub b: OpSpan,
}

/// Styling class of one word-level fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordTag {
    /// Present on both sides.
    Unchanged,
    /// Present only in the original.
    Removed,
    /// Present only in the revision.
    Added,
    /// Whitespace-only change, emitted unstyled to keep layout.
    Layout,
}

/// One fragment of a word-level diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSegment {
    pub tag: WordTag,
    pub text: String,
}

/// One rendered line of a lexical diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineChange {
    Equal { text: String },
    Added { text: String },
    Deleted { text: String },
    Modified { segments: Vec<WordSegment> },
}

/// Line counters for a lexical diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineSummary {
    pub lines_added: usize,
    pub lines_deleted: usize,
    pub lines_modified: usize,
}

impl LineSummary {
    pub fn total(&self) -> usize {
        self.lines_added + self.lines_deleted + self.lines_modified
    }
}

/// Output of the lexical engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LexicalDiff {
    pub opcodes: Vec<Opcode>,
    pub lines: Vec<LineChange>,
    pub summary: LineSummary,
}

/// Classification of one change block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Equal,
    Added,
    Deleted,
    Modified,
}

impl ChangeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeStatus::Equal => "equal",
            ChangeStatus::Added => "added",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Modified => "modified",
        }
    }
}

/// A classified pair of text spans.
///
/// `Deleted` blocks carry no revised text and `Added` blocks carry no
/// original text. Concatenating `text_a` over a block list rebuilds the
/// original side; `text_b` rebuilds the revised side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    pub status: ChangeStatus,
    pub text_a: String,
    pub text_b: String,
}

impl ChangeBlock {
    pub fn equal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            status: ChangeStatus::Equal,
            text_a: text.clone(),
            text_b: text,
        }
    }

    pub fn added(text_b: impl Into<String>) -> Self {
        Self {
            status: ChangeStatus::Added,
            text_a: String::new(),
            text_b: text_b.into(),
        }
    }

    pub fn deleted(text_a: impl Into<String>) -> Self {
        Self {
            status: ChangeStatus::Deleted,
            text_a: text_a.into(),
            text_b: String::new(),
        }
    }

    pub fn modified(text_a: impl Into<String>, text_b: impl Into<String>) -> Self {
        Self {
            status: ChangeStatus::Modified,
            text_a: text_a.into(),
            text_b: text_b.into(),
        }
    }
}

/// Character counters for a semantic diff, derived from the final block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockSummary {
    pub added_chars: usize,
    pub deleted_chars: usize,
    pub modified_blocks: usize,
    pub modified_chars: usize,
}

/// Warning emitted while reconciling classifier output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub level: FindingLevel,
    pub message: String,
    pub block: Option<usize>,
}

/// Severity level for a [`Finding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingLevel {
    Warning,
    Info,
}

/// Output of the semantic reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SemanticDiff {
    pub model_id: String,
    pub blocks: Vec<ChangeBlock>,
    pub summary: BlockSummary,
    pub warnings: Vec<Finding>,
    pub oracle_calls: usize,
}

/// Comparison strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    Lexical,
    Semantic,
}

/// Strategy-specific result payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ComparisonDetail {
    Lexical(LexicalDiff),
    Semantic(SemanticDiff),
}

/// Top-level result of one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub mode: ComparisonMode,
    pub is_identical: bool,
    pub is_identical_raw: bool,
    pub markup: String,
    pub detail: ComparisonDetail,
}

impl Comparison {
    pub fn has_changes(&self) -> bool {
        !self.is_identical
    }
}
