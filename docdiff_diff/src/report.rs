use crate::model::{
    ChangeStatus, Comparison, ComparisonDetail, LexicalDiff, LineChange, SemanticDiff, WordTag,
};

const EXCERPT_CHARS: usize = 60;

/// Format a markdown-oriented human report from a comparison result.
pub fn format_summary_report(comparison: &Comparison, left_label: &str, right_label: &str) -> String {
    let mut out = String::new();
    out.push_str("# Document Diff Report\n\n");
    out.push_str(&format!("- Original: `{left_label}`\n"));
    out.push_str(&format!("- Revised: `{right_label}`\n"));
    out.push_str(&format!(
        "- Mode: {}\n\n",
        match comparison.detail {
            ComparisonDetail::Lexical(_) => "lexical",
            ComparisonDetail::Semantic(_) => "semantic",
        }
    ));

    if comparison.is_identical {
        out.push_str(if comparison.is_identical_raw {
            "Documents are identical.\n"
        } else {
            "Documents are identical after normalization.\n"
        });
        return out;
    }

    match &comparison.detail {
        ComparisonDetail::Lexical(diff) => push_lexical(&mut out, diff),
        ComparisonDetail::Semantic(diff) => push_semantic(&mut out, diff),
    }

    out
}

fn push_lexical(out: &mut String, diff: &LexicalDiff) {
    out.push_str("## Stats\n\n");
    out.push_str(&format!("- Added lines: {}\n", diff.summary.lines_added));
    out.push_str(&format!("- Deleted lines: {}\n", diff.summary.lines_deleted));
    out.push_str(&format!("- Modified lines: {}\n\n", diff.summary.lines_modified));

    out.push_str("## Changes\n\n");
    let mut listed = 0usize;
    for line in &diff.lines {
        let entry = match line {
            LineChange::Equal { .. } => continue,
            LineChange::Added { text } => format!("Added: {}", excerpt(text)),
            LineChange::Deleted { text } => format!("Deleted: {}", excerpt(text)),
            LineChange::Modified { segments } => {
                let revised = segments
                    .iter()
                    .filter(|s| s.tag != WordTag::Removed)
                    .map(|s| s.text.as_str())
                    .collect::<String>();
                format!("Modified: {}", excerpt(&revised))
            }
        };
        listed += 1;
        out.push_str(&format!("{listed}. {entry}\n"));
    }
    if listed == 0 {
        out.push_str("No line changes after normalization.\n");
    }
}

fn push_semantic(out: &mut String, diff: &SemanticDiff) {
    out.push_str("## Stats\n\n");
    out.push_str(&format!("- Model: `{}`\n", diff.model_id));
    out.push_str(&format!("- Classifier calls: {}\n", diff.oracle_calls));
    out.push_str(&format!("- Added characters: {}\n", diff.summary.added_chars));
    out.push_str(&format!("- Deleted characters: {}\n", diff.summary.deleted_chars));
    out.push_str(&format!(
        "- Modified blocks: {} ({} characters)\n\n",
        diff.summary.modified_blocks, diff.summary.modified_chars
    ));

    out.push_str("## Blocks\n\n");
    let mut listed = 0usize;
    for block in &diff.blocks {
        let text = match block.status {
            ChangeStatus::Equal => continue,
            ChangeStatus::Deleted => &block.text_a,
            ChangeStatus::Added | ChangeStatus::Modified => &block.text_b,
        };
        listed += 1;
        out.push_str(&format!("{listed}. {}: {}\n", block.status.as_str(), excerpt(text)));
    }
    if listed == 0 {
        out.push_str("No changed blocks.\n");
    }

    if !diff.warnings.is_empty() {
        out.push_str("\n## Findings\n\n");
        for finding in &diff.warnings {
            let at = finding
                .block
                .map(|idx| format!(" (block {})", idx + 1))
                .unwrap_or_default();
            out.push_str(&format!(
                "- {:?} [{}]{at}: {}\n",
                finding.level, finding.code, finding.message
            ));
        }
    }
}

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return format!("`{flat}`");
    }
    let cut = flat.chars().take(EXCERPT_CHARS).collect::<String>();
    format!("`{cut}...`")
}
