use tracing::debug;

use crate::align::{compute_opcodes, content_keys};
use crate::model::{LexicalDiff, LineChange, LineSummary, OpTag};
use crate::words::diff_words;

/// Compute a deterministic line diff between two normalized line sequences.
///
/// Replaced regions are paired line by line; paired lines carry a
/// word-level diff, unpaired surplus lines are reported as added or deleted.
pub fn diff_lines<S: AsRef<str>>(a: &[S], b: &[S]) -> LexicalDiff {
    let opcodes = compute_opcodes(&content_keys(a), &content_keys(b));

    let mut lines = Vec::new();
    let mut summary = LineSummary::default();

    for op in &opcodes {
        let left = &a[op.a.start..op.a.end];
        let right = &b[op.b.start..op.b.end];
        match op.tag {
            OpTag::Equal => {
                lines.extend(left.iter().map(|line| LineChange::Equal {
                    text: line.as_ref().to_string(),
                }));
            }
            OpTag::Insert => {
                summary.lines_added += right.len();
                lines.extend(right.iter().map(|line| LineChange::Added {
                    text: line.as_ref().to_string(),
                }));
            }
            OpTag::Delete => {
                summary.lines_deleted += left.len();
                lines.extend(left.iter().map(|line| LineChange::Deleted {
                    text: line.as_ref().to_string(),
                }));
            }
            OpTag::Replace => {
                let paired = left.len().max(right.len());
                summary.lines_modified += paired;
                for idx in 0..paired {
                    let change = match (left.get(idx), right.get(idx)) {
                        (Some(old), Some(new)) => LineChange::Modified {
                            segments: diff_words(old.as_ref(), new.as_ref()),
                        },
                        (None, Some(new)) => LineChange::Added {
                            text: new.as_ref().to_string(),
                        },
                        (Some(old), None) => LineChange::Deleted {
                            text: old.as_ref().to_string(),
                        },
                        (None, None) => continue,
                    };
                    lines.push(change);
                }
            }
        }
    }

    debug!(
        opcodes = opcodes.len(),
        lines_added = summary.lines_added,
        lines_deleted = summary.lines_deleted,
        lines_modified = summary.lines_modified,
        "computed line diff"
    );

    LexicalDiff {
        opcodes,
        lines,
        summary,
    }
}
