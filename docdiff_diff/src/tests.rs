use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use docdiff_text::{ExtractionError, NormalizeOptions, Tokenizer};

use super::{
    ChangeBlock, ChangeClassifier, ChangeStatus, Comparator, CompareError, ComparisonDetail, ComparisonMode,
    DocumentSide, ErrorKind, LexicalComparator, LineChange, OpTag, OracleError, ReconcileOptions,
    SemanticComparator, SemanticOptions, WordTag, compare_sources, diff_lines, reconcile,
    summarize_blocks,
};

struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn truncate(&self, text: &str, max_tokens: usize) -> String {
        text.split_whitespace()
            .take(max_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn no_delay() -> ReconcileOptions {
    ReconcileOptions {
        call_delay: Duration::ZERO,
    }
}

fn chunks(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn semantic<O: ChangeClassifier>(oracle: O) -> SemanticComparator<O> {
    let options = SemanticOptions {
        call_delay_ms: 0,
        ..SemanticOptions::default()
    };
    SemanticComparator::with_tokenizer(options, oracle, Box::new(WordTokenizer))
}

fn never_called(_: &str, _: &str) -> Result<Vec<ChangeBlock>, OracleError> {
    panic!("classifier must not be called")
}

#[test]
fn identical_documents_report_no_changes() {
    let result = LexicalComparator::default()
        .compare("The cat sat.\n", "The cat sat.\n")
        .expect("compare");

    assert!(result.is_identical);
    assert!(result.is_identical_raw);
    assert!(result.markup.is_empty());
    match result.detail {
        ComparisonDetail::Lexical(diff) => assert_eq!(diff.summary.total(), 0),
        other => panic!("unexpected detail: {other:?}"),
    }
}

#[test]
fn changed_word_is_one_modified_line() {
    let a = ["line one", "line two"];
    let b = ["line one", "line TWO"];

    let diff = diff_lines(&a, &b);
    let replaces = diff
        .opcodes
        .iter()
        .filter(|op| op.tag == OpTag::Replace)
        .count();
    assert_eq!(replaces, 1);
    assert_eq!(diff.summary.lines_modified, 1);
    assert_eq!(diff.summary.lines_added, 0);
    assert_eq!(diff.summary.lines_deleted, 0);

    match &diff.lines[1] {
        LineChange::Modified { segments } => {
            assert!(
                segments
                    .iter()
                    .any(|s| s.tag == WordTag::Removed && s.text == "two")
            );
            assert!(
                segments
                    .iter()
                    .any(|s| s.tag == WordTag::Added && s.text == "TWO")
            );
        }
        other => panic!("expected modified line, got {other:?}"),
    }
}

#[test]
fn changed_word_markup_marks_both_sides() {
    let result = LexicalComparator::default()
        .compare("line one\nline two", "line one\nline TWO")
        .expect("compare");

    assert!(!result.is_identical);
    assert_eq!(
        result.markup,
        "<span class='diff-line diff-equal'><span class='diff-marker'> </span>line one</span>\n\
         <span class='diff-line diff-modified'><span class='diff-marker'>*</span>line \
         <span class='word-deleted'>two</span><span class='word-added'>TWO</span></span>"
    );
}

#[test]
fn appended_line_is_single_insert() {
    let diff = diff_lines(&["Hello world"], &["Hello world", "extra"]);

    assert_eq!(
        diff.opcodes.iter().map(|op| op.tag).collect::<Vec<_>>(),
        vec![OpTag::Equal, OpTag::Insert]
    );
    assert_eq!(diff.summary.lines_added, 1);
    assert_eq!(diff.summary.lines_modified, 0);
    assert_eq!(
        diff.lines[1],
        LineChange::Added {
            text: "extra".to_string()
        }
    );
}

#[test]
fn appended_word_on_same_line_is_word_insert() {
    let diff = diff_lines(&["Hello world"], &["Hello world extra"]);

    assert_eq!(diff.summary.lines_modified, 1);
    match &diff.lines[0] {
        LineChange::Modified { segments } => {
            let added = segments
                .iter()
                .filter(|s| s.tag == WordTag::Added)
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>();
            assert_eq!(added, vec![" extra"]);
            assert!(segments.iter().all(|s| s.tag != WordTag::Removed));
        }
        other => panic!("expected modified line, got {other:?}"),
    }
}

#[test]
fn case_folding_makes_documents_identical() {
    let comparator = LexicalComparator::new(NormalizeOptions {
        ignore_case: true,
        ..NormalizeOptions::default()
    });
    let result = comparator
        .compare("Line One\nLINE TWO", "line one\nline two")
        .expect("compare");

    assert!(result.is_identical);
    assert!(!result.is_identical_raw);
}

#[test]
fn options_disable_raw_fast_path() {
    let comparator = LexicalComparator::new(NormalizeOptions {
        ignore_punctuation: true,
        ..NormalizeOptions::default()
    });
    let result = comparator.compare("Same text.", "Same text.").expect("compare");

    assert!(result.is_identical);
    assert!(result.is_identical_raw);
}

#[test]
fn text_that_normalizes_to_nothing_is_preprocessing_error() {
    let comparator = LexicalComparator::new(NormalizeOptions {
        ignore_punctuation: true,
        ..NormalizeOptions::default()
    });
    let err = comparator
        .compare("...!!!\n???", "real words")
        .expect_err("must fail");

    assert_eq!(err.kind(), ErrorKind::Preprocessing);
    assert!(err.to_string().contains("document 1"));
}

#[test]
fn blank_side_is_all_added_lines() {
    let result = LexicalComparator::default()
        .compare("", "first\nsecond")
        .expect("compare");

    match result.detail {
        ComparisonDetail::Lexical(diff) => {
            assert_eq!(diff.summary.lines_added, 2);
            assert_eq!(diff.opcodes.len(), 1);
            assert_eq!(diff.opcodes[0].tag, OpTag::Insert);
        }
        other => panic!("unexpected detail: {other:?}"),
    }
    assert!(result.markup.contains("diff-added"));
}

#[test]
fn links_in_unchanged_lines_are_wrapped() {
    let result = LexicalComparator::default()
        .compare("see https://example.com/a\nold", "see https://example.com/a\nnew")
        .expect("compare");

    assert!(result.markup.contains(
        "<a class='diff-link' href=\"https://example.com/a\" target=\"_blank\""
    ));
}

#[test]
fn one_sided_chunk_is_deleted_without_call() {
    let outcome = reconcile(&chunks(&["X"]), &[], &never_called, &no_delay()).expect("reconcile");

    assert_eq!(outcome.blocks, vec![ChangeBlock::deleted("X")]);
    assert_eq!(outcome.oracle_calls, 0);
    assert_eq!(outcome.summary.deleted_chars, 1);
}

#[test]
fn identical_and_blank_pairs_are_resolved_locally() {
    let outcome = reconcile(
        &chunks(&["same", "  ", ""]),
        &chunks(&["same", "", "new"]),
        &never_called,
        &no_delay(),
    )
    .expect("reconcile");

    assert_eq!(
        outcome.blocks,
        vec![ChangeBlock::equal("same"), ChangeBlock::added("new")]
    );
    assert_eq!(outcome.summary.added_chars, 3);
    assert_eq!(outcome.oracle_calls, 0);
}

#[test]
fn classifier_failure_aborts_reconciliation() {
    let calls = Cell::new(0usize);
    let classifier = |a: &str, b: &str| {
        calls.set(calls.get() + 1);
        if calls.get() == 2 {
            return Err(OracleError::RateLimited("slow down".to_string()));
        }
        Ok(vec![ChangeBlock::modified(a, b)])
    };

    let err = reconcile(
        &chunks(&["one", "two", "three"]),
        &chunks(&["uno", "dos", "tres"]),
        &classifier,
        &no_delay(),
    )
    .expect_err("second pair fails");

    assert_eq!(calls.get(), 2);
    assert_eq!(err.kind(), ErrorKind::Oracle);
    match err {
        CompareError::Oracle { pair, source } => {
            assert_eq!(pair, 1);
            assert_eq!(source, OracleError::RateLimited("slow down".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn call_delay_separates_classifier_calls_only() {
    let started = RefCell::new(Vec::new());
    let classifier = |a: &str, b: &str| -> Result<Vec<ChangeBlock>, OracleError> {
        started.borrow_mut().push(Instant::now());
        Ok(vec![ChangeBlock::modified(a, b)])
    };
    let options = ReconcileOptions {
        call_delay: Duration::from_millis(40),
    };

    let outcome = reconcile(
        &chunks(&["same", "one", "", "two"]),
        &chunks(&["same", "uno", "extra", "dos"]),
        &classifier,
        &options,
    )
    .expect("reconcile");

    assert_eq!(outcome.oracle_calls, 2);
    assert_eq!(outcome.blocks.len(), 4);
    let started = started.borrow();
    assert_eq!(started.len(), 2);
    assert!(started[1].duration_since(started[0]) >= options.call_delay);
}

#[test]
fn inconsistent_blocks_are_corrected_with_warnings() {
    let classifier = |_: &str, _: &str| -> Result<Vec<ChangeBlock>, OracleError> {
        Ok(vec![
            ChangeBlock {
                status: ChangeStatus::Deleted,
                text_a: "gone".to_string(),
                text_b: "stray".to_string(),
            },
            ChangeBlock {
                status: ChangeStatus::Added,
                text_a: "stray".to_string(),
                text_b: "new".to_string(),
            },
        ])
    };

    let outcome = reconcile(&chunks(&["gone"]), &chunks(&["new"]), &classifier, &no_delay())
        .expect("reconcile");

    assert_eq!(
        outcome.blocks,
        vec![ChangeBlock::deleted("gone"), ChangeBlock::added("new")]
    );
    let codes = outcome
        .warnings
        .iter()
        .map(|w| w.code.as_str())
        .collect::<Vec<_>>();
    assert_eq!(codes, vec!["corrected_deleted_text", "corrected_added_text"]);
    assert_eq!(outcome.warnings[1].block, Some(1));
}

#[test]
fn modified_block_counts_word_changes() {
    let summary = summarize_blocks(&[ChangeBlock::modified("the cat", "the dog")]);

    assert_eq!(summary.modified_blocks, 1);
    assert_eq!(summary.modified_chars, 7);
    assert_eq!(summary.added_chars, 3);
    assert_eq!(summary.deleted_chars, 3);
}

#[test]
fn semantic_identical_text_skips_classifier() {
    let result = semantic(never_called)
        .compare("Same text.", "Same text.")
        .expect("compare");

    assert_eq!(result.mode, ComparisonMode::Semantic);
    assert!(result.is_identical);
    assert!(result.is_identical_raw);
}

#[test]
fn semantic_blank_documents_are_identical() {
    let result = semantic(never_called).compare("  ", "\n").expect("compare");

    assert!(result.is_identical);
    assert!(!result.is_identical_raw);
}

#[test]
fn semantic_comparison_renders_classified_blocks() {
    let classifier = |a: &str, b: &str| -> Result<Vec<ChangeBlock>, OracleError> {
        // A lone sentence falls through to word splitting.
        assert_eq!(a, "The\n\ncat\n\nsat.");
        assert_eq!(b, "The\n\ndog\n\nsat.");
        Ok(vec![
            ChangeBlock::equal("The "),
            ChangeBlock::modified("cat", "dog"),
            ChangeBlock::equal(" sat."),
        ])
    };
    let result = semantic(classifier)
        .compare("The cat sat.", "The dog sat.")
        .expect("compare");

    assert!(!result.is_identical);
    assert!(result.markup.starts_with("<div class='diff-llm-container-inner'>"));
    assert!(
        result
            .markup
            .contains("<span class='llm-word status-deleted'>cat</span>")
    );
    assert!(
        result
            .markup
            .contains("<span class='llm-word status-added'>dog</span>")
    );
    match result.detail {
        ComparisonDetail::Semantic(diff) => {
            assert_eq!(diff.oracle_calls, 1);
            assert_eq!(diff.model_id, "llama3-8b-8192");
            assert_eq!(diff.summary.modified_blocks, 1);
            assert!(diff.warnings.is_empty());
        }
        other => panic!("unexpected detail: {other:?}"),
    }
}

#[test]
fn semantic_failure_has_oracle_kind() {
    let classifier = |_: &str, _: &str| -> Result<Vec<ChangeBlock>, OracleError> {
        Err(OracleError::Transport("connection reset".to_string()))
    };
    let err = semantic(classifier)
        .compare("before", "after")
        .expect_err("must fail");

    assert_eq!(err.kind(), ErrorKind::Oracle);
    assert!(err.to_string().contains("chunk pair 1"));
}

#[test]
fn extraction_failure_short_circuits() {
    let err = compare_sources(
        &LexicalComparator::default(),
        Ok("text".to_string()),
        Err(ExtractionError::Unsupported {
            extension: "pdf".to_string(),
        }),
    )
    .expect_err("must fail");

    assert_eq!(err.kind(), ErrorKind::Extraction);
    match err {
        CompareError::Extraction { side, .. } => assert_eq!(side, DocumentSide::Revised),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn semantic_chunk_floor_is_applied() {
    let options = SemanticOptions {
        max_chunk_tokens: 10,
        ..SemanticOptions::default()
    };
    assert_eq!(options.effective_max_chunk_tokens(), 500);
    assert_eq!(SemanticOptions::default().effective_max_chunk_tokens(), 2000);
}
