use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tiktoken_rs::{CoreBPE, cl100k_base};
use tracing::{debug, warn};

/// Smallest token budget a chunker accepts; lower requests are raised to it.
pub const MIN_CHUNK_TOKENS: usize = 500;

/// Token budget used when the caller does not configure one.
pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 2000;

/// Canonical separator placed between packed parts of one chunk.
pub const PART_SEPARATOR: &str = "\n\n";

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph pattern"));
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence pattern"));

/// Errors raised while preparing a chunker.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("tokenizer initialisation failed: {0}")]
    Tokenizer(String),
}

/// Deterministic token counter used for chunk budgeting.
pub trait Tokenizer {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
    /// Longest prefix of `text` that fits in `max_tokens`.
    fn truncate(&self, text: &str, max_tokens: usize) -> String;
}

/// `cl100k_base` byte-pair encoding.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    /// Load the embedded `cl100k_base` ranks.
    pub fn new() -> Result<Self, ChunkError> {
        let bpe = cl100k_base().map_err(|err| ChunkError::Tokenizer(err.to_string()))?;
        Ok(Self { bpe })
    }
}

impl fmt::Debug for Cl100kTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cl100kTokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn truncate(&self, text: &str, max_tokens: usize) -> String {
        let tokens = self.bpe.encode_ordinary(text);
        let mut take = max_tokens.min(tokens.len());
        // A cut can land inside a multi-byte char; back off until it decodes.
        while take > 0 {
            if let Ok(prefix) = self.bpe.decode(tokens[..take].to_vec()) {
                return prefix;
            }
            take -= 1;
        }
        String::new()
    }
}

/// Splits text into ordered chunks that each fit a token budget.
///
/// Parts are found by the first strategy that yields more than one piece:
/// blank-line paragraphs, sentence ends, single newlines, then words. Parts
/// are packed greedily and joined with [`PART_SEPARATOR`]. A part that is
/// larger than the budget on its own is re-packed word by word; a single
/// word larger than the budget is truncated.
pub struct TokenChunker<'a> {
    tokenizer: &'a dyn Tokenizer,
    max_tokens: usize,
}

impl<'a> TokenChunker<'a> {
    /// Create a chunker; `max_tokens` below [`MIN_CHUNK_TOKENS`] is raised to it.
    pub fn new(tokenizer: &'a dyn Tokenizer, max_tokens: usize) -> Self {
        Self {
            tokenizer,
            max_tokens: max_tokens.max(MIN_CHUNK_TOKENS),
        }
    }

    /// Effective budget after applying the floor.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Split `raw` into chunks. Empty or whitespace-only chunks are never returned.
    pub fn chunk(&self, raw: &str) -> Vec<String> {
        let text = raw.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let separator_tokens = self.tokenizer.count(PART_SEPARATOR);
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_tokens = 0usize;

        for part in split_parts(text) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let part_tokens = self.tokenizer.count(part);
            if part_tokens > self.max_tokens {
                flush_parts(&mut chunks, &mut current);
                current_tokens = 0;
                self.pack_words(part, &mut chunks);
                continue;
            }

            let overhead = if current.is_empty() {
                0
            } else {
                separator_tokens
            };
            let potential = current_tokens + overhead + part_tokens;
            if potential <= self.max_tokens {
                current.push(part);
                current_tokens = potential;
            } else {
                flush_parts(&mut chunks, &mut current);
                current.push(part);
                current_tokens = part_tokens;
            }
        }
        flush_parts(&mut chunks, &mut current);

        chunks.retain(|chunk| !chunk.trim().is_empty());
        debug!(
            chunks = chunks.len(),
            max_tokens = self.max_tokens,
            "chunked text"
        );
        chunks
    }

    fn pack_words(&self, part: &str, chunks: &mut Vec<String>) {
        let mut sub_chunk = String::new();
        let mut sub_tokens = 0usize;

        for word in part.split_whitespace() {
            let word_tokens = if sub_chunk.is_empty() {
                self.tokenizer.count(word)
            } else {
                self.tokenizer.count(&format!(" {word}"))
            };

            if sub_tokens + word_tokens <= self.max_tokens {
                if !sub_chunk.is_empty() {
                    sub_chunk.push(' ');
                }
                sub_chunk.push_str(word);
                sub_tokens += word_tokens;
                continue;
            }

            if !sub_chunk.is_empty() {
                chunks.push(std::mem::take(&mut sub_chunk));
            }

            let alone = self.tokenizer.count(word);
            if alone <= self.max_tokens {
                sub_chunk.push_str(word);
                sub_tokens = alone;
            } else {
                let preview = word.chars().take(100).collect::<String>();
                warn!(
                    word_tokens = alone,
                    max_tokens = self.max_tokens,
                    "word exceeds chunk budget, truncating: '{preview}...'"
                );
                chunks.push(self.tokenizer.truncate(word, self.max_tokens));
                sub_tokens = 0;
            }
        }

        if !sub_chunk.is_empty() {
            chunks.push(sub_chunk);
        }
    }
}

fn flush_parts(chunks: &mut Vec<String>, current: &mut Vec<&str>) {
    if !current.is_empty() {
        chunks.push(current.join(PART_SEPARATOR));
        current.clear();
    }
}

fn split_parts(text: &str) -> Vec<&str> {
    let paragraphs = PARAGRAPH_BREAK.split(text).collect::<Vec<_>>();
    if paragraphs.len() > 1 {
        return paragraphs;
    }

    let sentences = split_sentences(text);
    if sentences.len() > 1 {
        return sentences;
    }

    let lines = text.split('\n').collect::<Vec<_>>();
    if lines.len() > 1 {
        return lines;
    }

    text.split_whitespace().collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0usize;
    for found in SENTENCE_BREAK.find_iter(text) {
        // Keep the terminator (always one ASCII byte) with its sentence.
        parts.push(&text[start..found.start() + 1]);
        start = found.end();
    }
    parts.push(&text[start..]);
    parts
}
