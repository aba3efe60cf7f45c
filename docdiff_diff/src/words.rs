use crate::align::{compute_opcodes, content_keys};
use crate::model::{OpTag, Opcode, WordSegment, WordTag};

/// Word-token alignment of two strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAlignment<'a> {
    pub tokens_a: Vec<&'a str>,
    pub tokens_b: Vec<&'a str>,
    pub opcodes: Vec<Opcode>,
}

impl<'a> WordAlignment<'a> {
    /// Text covered by `op` on the original side.
    pub fn text_a(&self, op: &Opcode) -> String {
        self.tokens_a[op.a.start..op.a.end].concat()
    }

    /// Text covered by `op` on the revised side.
    pub fn text_b(&self, op: &Opcode) -> String {
        self.tokens_b[op.b.start..op.b.end].concat()
    }
}

/// Split text into alternating word and whitespace-run tokens.
///
/// Concatenating the tokens reproduces the input exactly.
pub fn tokenize_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0usize;
    let mut in_space: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Align the word tokens of two strings.
pub fn align_words<'a>(line_a: &'a str, line_b: &'a str) -> WordAlignment<'a> {
    let tokens_a = tokenize_words(line_a);
    let tokens_b = tokenize_words(line_b);
    let opcodes = compute_opcodes(&content_keys(&tokens_a), &content_keys(&tokens_b));
    WordAlignment {
        tokens_a,
        tokens_b,
        opcodes,
    }
}

/// Word-level diff of two strings as an ordered list of tagged fragments.
///
/// Whitespace-only insertions, deletions and replacements are emitted as
/// [`WordTag::Layout`] so they are never styled as a change.
pub fn diff_words(line_a: &str, line_b: &str) -> Vec<WordSegment> {
    let alignment = align_words(line_a, line_b);
    let mut segments = Vec::new();

    for op in &alignment.opcodes {
        let text_a = alignment.text_a(op);
        let text_b = alignment.text_b(op);
        match op.tag {
            OpTag::Equal => push_segment(&mut segments, WordTag::Unchanged, text_b),
            OpTag::Delete => push_styled(&mut segments, WordTag::Removed, text_a),
            OpTag::Insert => push_styled(&mut segments, WordTag::Added, text_b),
            OpTag::Replace => {
                let a_blank = text_a.trim().is_empty();
                let b_blank = text_b.trim().is_empty();
                if !a_blank {
                    push_segment(&mut segments, WordTag::Removed, text_a);
                }
                if b_blank {
                    push_segment(&mut segments, WordTag::Layout, text_b);
                } else {
                    push_segment(&mut segments, WordTag::Added, text_b);
                }
            }
        }
    }

    segments
}

fn push_styled(segments: &mut Vec<WordSegment>, tag: WordTag, text: String) {
    let tag = if text.trim().is_empty() {
        WordTag::Layout
    } else {
        tag
    };
    push_segment(segments, tag, text);
}

fn push_segment(segments: &mut Vec<WordSegment>, tag: WordTag, text: String) {
    if !text.is_empty() {
        segments.push(WordSegment { tag, text });
    }
}
