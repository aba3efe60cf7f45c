use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SOFT_HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*\n\s*").expect("valid de-hyphenation pattern"));

/// Options controlling how raw text is folded before lexical comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub ignore_case: bool,
    pub ignore_punctuation: bool,
    pub de_hyphenate: bool,
}

impl NormalizeOptions {
    /// True when at least one folding option is enabled.
    ///
    /// Raw-equality shortcuts are only sound when this is false.
    pub fn any_enabled(&self) -> bool {
        self.ignore_case || self.ignore_punctuation || self.de_hyphenate
    }
}

/// Turn raw text into an ordered sequence of non-empty comparison lines.
pub fn normalize(raw: &str, options: &NormalizeOptions) -> Vec<String> {
    let text = if options.de_hyphenate {
        SOFT_HYPHEN_BREAK.replace_all(raw, "")
    } else {
        raw.into()
    };

    text.split(is_line_boundary)
        .filter_map(|line| normalize_line(line, options))
        .collect()
}

/// Normalize and re-join lines with `\n`.
///
/// Feeding the output back through [`normalize`] yields the same lines.
pub fn normalize_text(raw: &str, options: &NormalizeOptions) -> String {
    normalize(raw, options).join("\n")
}

/// Line terminators recognised when splitting, including form feed and the
/// Unicode line and paragraph separators.
fn is_line_boundary(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn normalize_line(line: &str, options: &NormalizeOptions) -> Option<String> {
    let mut output = if options.ignore_case {
        line.to_lowercase()
    } else {
        line.to_string()
    };

    if options.ignore_punctuation {
        output.retain(|ch| !ch.is_ascii_punctuation());
    }

    let collapsed = output.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
