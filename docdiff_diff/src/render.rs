use std::fmt::{self, Write};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ChangeBlock, ChangeStatus, LexicalDiff, LineChange, WordSegment, WordTag};
use crate::words::diff_words;

pub const CLASS_LINE: &str = "diff-line";
pub const CLASS_MARKER: &str = "diff-marker";
pub const CLASS_EQUAL: &str = "diff-equal";
pub const CLASS_ADDED: &str = "diff-added";
pub const CLASS_DELETED: &str = "diff-deleted";
pub const CLASS_MODIFIED: &str = "diff-modified";
pub const CLASS_WORD_ADDED: &str = "word-added";
pub const CLASS_WORD_DELETED: &str = "word-deleted";
pub const CLASS_LINK: &str = "diff-link";
pub const CLASS_BLOCK_CONTAINER: &str = "diff-llm-container-inner";
pub const CLASS_BLOCK_WORD: &str = "llm-word";
pub const CLASS_STATUS_EQUAL: &str = "status-equal";
pub const CLASS_STATUS_ADDED: &str = "status-added";
pub const CLASS_STATUS_DELETED: &str = "status-deleted";

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://|ftp://|www\.)[^\s/$.?#].[^\s]*").expect("valid link pattern")
});

/// Escape the five markup-sensitive characters.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap URL-like runs of already escaped text in link elements.
///
/// Bare `www.` hosts get an `http://` scheme in the target. The input must
/// be escaped first; nothing here escapes again.
pub fn linkify(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut last = 0usize;

    for found in LINK.find_iter(escaped) {
        out.push_str(&escaped[last..found.start()]);
        let url = found.as_str();
        let href = if url.starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        out.push_str(&format!(
            "<a class='{CLASS_LINK}' href=\"{href}\" target=\"_blank\" title=\"Open link: {href}\">{url}</a>"
        ));
        last = found.end();
    }
    out.push_str(&escaped[last..]);

    out
}

/// Render a lexical diff as one markup line per compared line.
pub fn render_lexical_markup(diff: &LexicalDiff) -> Result<String, fmt::Error> {
    let mut out = String::new();

    for (idx, line) in diff.lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let (class, marker) = match line {
            LineChange::Equal { .. } => (CLASS_EQUAL, ' '),
            LineChange::Added { .. } => (CLASS_ADDED, '+'),
            LineChange::Deleted { .. } => (CLASS_DELETED, '-'),
            LineChange::Modified { .. } => (CLASS_MODIFIED, '*'),
        };
        write!(
            out,
            "<span class='{CLASS_LINE} {class}'><span class='{CLASS_MARKER}'>{marker}</span>"
        )?;
        match line {
            LineChange::Equal { text } | LineChange::Added { text } | LineChange::Deleted { text } => {
                out.push_str(&linkify(&escape_markup(text)));
            }
            LineChange::Modified { segments } => write_word_segments(&mut out, segments)?,
        }
        out.push_str("</span>");
    }

    Ok(out)
}

fn write_word_segments(out: &mut String, segments: &[WordSegment]) -> fmt::Result {
    for segment in segments {
        let escaped = escape_markup(&segment.text);
        match segment.tag {
            WordTag::Unchanged => out.push_str(&linkify(&escaped)),
            WordTag::Layout => out.push_str(&escaped),
            WordTag::Removed => write!(out, "<span class='{CLASS_WORD_DELETED}'>{escaped}</span>")?,
            WordTag::Added => write!(out, "<span class='{CLASS_WORD_ADDED}'>{escaped}</span>")?,
        }
    }
    Ok(())
}

/// Render a classified block stream as a single inline container.
///
/// Newlines become `<br>` so block text keeps its line structure.
pub fn render_semantic_markup(blocks: &[ChangeBlock]) -> Result<String, fmt::Error> {
    let mut body = String::new();

    for block in blocks {
        match block.status {
            ChangeStatus::Equal => {
                write_block_span(&mut body, CLASS_STATUS_EQUAL, &linkify(&escape_markup(&block.text_b)))?
            }
            ChangeStatus::Added => {
                write_block_span(&mut body, CLASS_STATUS_ADDED, &escape_markup(&block.text_b))?
            }
            ChangeStatus::Deleted => {
                write_block_span(&mut body, CLASS_STATUS_DELETED, &escape_markup(&block.text_a))?
            }
            ChangeStatus::Modified => {
                for segment in diff_words(&block.text_a, &block.text_b) {
                    let escaped = escape_markup(&segment.text);
                    match segment.tag {
                        WordTag::Unchanged => {
                            write_block_span(&mut body, CLASS_STATUS_EQUAL, &linkify(&escaped))?
                        }
                        WordTag::Removed => {
                            write_block_span(&mut body, CLASS_STATUS_DELETED, &escaped)?
                        }
                        WordTag::Added => write_block_span(&mut body, CLASS_STATUS_ADDED, &escaped)?,
                        WordTag::Layout => body.push_str(&line_breaks(&escaped)),
                    }
                }
            }
        }
    }

    let mut out = String::new();
    write!(out, "<div class='{CLASS_BLOCK_CONTAINER}'>{body}</div>")?;
    Ok(out)
}

fn write_block_span(out: &mut String, status_class: &str, escaped: &str) -> fmt::Result {
    if escaped.is_empty() {
        return Ok(());
    }
    write!(
        out,
        "<span class='{CLASS_BLOCK_WORD} {status_class}'>{}</span>",
        line_breaks(escaped)
    )
}

fn line_breaks(escaped: &str) -> String {
    escaped.replace('\n', "<br>\n")
}
