use docdiff_diff::{
    ChangeBlock, Comparator, LexicalComparator, OracleError, SemanticComparator, SemanticOptions,
    format_summary_report,
};
use docdiff_text::Tokenizer;

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

#[test]
fn markdown_report_lists_line_changes() {
    let result = LexicalComparator::default()
        .compare("keep\nold line\n", "keep\nnew line\nadded\n")
        .expect("compare");
    let report = format_summary_report(&result, "v1.txt", "v2.txt");

    assert!(report.contains("# Document Diff Report"));
    assert!(report.contains("- Original: `v1.txt`"));
    assert!(report.contains("- Mode: lexical"));
    assert!(report.contains("- Modified lines: 2"));
    assert!(report.contains("1. Modified: `new line`"));
    assert!(report.contains("2. Added: `added`"));
}

#[test]
fn markdown_report_for_identical_documents() {
    let result = LexicalComparator::default()
        .compare("same\n", "same\n")
        .expect("compare");
    let report = format_summary_report(&result, "a.txt", "b.txt");

    assert!(report.contains("Documents are identical."));
    assert!(!report.contains("## Stats"));
}

#[test]
fn markdown_report_lists_blocks_and_findings() {
    let classifier = |_: &str, _: &str| -> Result<Vec<ChangeBlock>, OracleError> {
        Ok(vec![
            ChangeBlock::equal("Intro. "),
            ChangeBlock::modified("", "fresh text"),
        ])
    };
    let options = SemanticOptions {
        model_id: "test-model".to_string(),
        ..SemanticOptions::default()
    };
    let result = SemanticComparator::with_tokenizer(options, classifier, Box::new(WordTokenizer))
        .compare("Intro.", "Intro. fresh text")
        .expect("compare");
    let report = format_summary_report(&result, "a.txt", "b.txt");

    assert!(report.contains("- Mode: semantic"));
    assert!(report.contains("- Model: `test-model`"));
    assert!(report.contains("- Classifier calls: 1"));
    assert!(report.contains("1. modified: `fresh text`"));
    assert!(report.contains("## Findings"));
    assert!(report.contains("[modified_missing_side] (block 2)"));
}

#[test]
fn json_output_is_stable_shape() {
    let result = LexicalComparator::default()
        .compare("a\n", "b\n")
        .expect("compare");
    let json = serde_json::to_string_pretty(&result).expect("serialize comparison");

    assert!(json.contains("\"is_identical\": false"));
    assert!(json.contains("\"lines_modified\": 1"));
    assert!(json.contains("\"kind\": \"modified\""));
    assert!(json.contains("\"tag\": \"removed\""));
}
