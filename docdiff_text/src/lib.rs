//! Text preparation for document comparison.
//!
//! This crate provides:
//! - a text source decoder (`decode_text`, `extract_text`)
//! - a comparison normalizer (`normalize`, `normalize_text`)
//! - a token-budgeted chunker (`TokenChunker`)
//!
//! Normalization is a pure function of the raw text and [`NormalizeOptions`]:
//! - optional de-hyphenation joins words split across line breaks
//! - each line is case/punctuation folded and whitespace collapsed
//! - lines that end up empty are dropped, order is preserved
//!
//! # Example
//!
//! ```rust
//! use docdiff_text::{NormalizeOptions, normalize};
//!
//! let options = NormalizeOptions {
//!     ignore_case: true,
//!     ..NormalizeOptions::default()
//! };
//! let lines = normalize("The  Cat\n\nSAT.\n", &options);
//! assert_eq!(lines, vec!["the cat".to_string(), "sat.".to_string()]);
//! ```

mod chunk;
mod normalize;
mod source;

pub use chunk::{
    ChunkError, Cl100kTokenizer, DEFAULT_MAX_CHUNK_TOKENS, MIN_CHUNK_TOKENS, PART_SEPARATOR,
    TokenChunker, Tokenizer,
};
pub use normalize::{NormalizeOptions, normalize, normalize_text};
pub use source::{ExtractionError, decode_text, extract_text};
