//! Change-block classifier for semantic document comparison.
//!
//! [`ChatCompletionsOracle`] sends one chunk pair per request to an
//! OpenAI-compatible chat-completions endpoint and decodes the returned
//! `change_blocks` document. It implements
//! [`docdiff_diff::ChangeClassifier`], so it plugs straight into
//! [`docdiff_diff::SemanticComparator`].
//!
//! # Example
//!
//! ```rust
//! use docdiff_diff::ChangeStatus;
//! use docdiff_oracle::parse_change_blocks;
//!
//! let blocks = parse_change_blocks(
//!     r#"{"change_blocks": [{"status": "added", "text1": "", "text2": "new"}]}"#,
//! )
//! .expect("valid response");
//! assert_eq!(blocks[0].status, ChangeStatus::Added);
//! ```

mod client;
mod codec;
mod prompt;

pub use client::{
    ChatCompletionsOracle, DEFAULT_ENDPOINT, DEFAULT_MAX_RESPONSE_TOKENS, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS, OracleConfig, error_for_status,
};
pub use codec::parse_change_blocks;
pub use prompt::build_prompt;
