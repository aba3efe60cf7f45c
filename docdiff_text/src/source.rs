use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

/// Reasons a document's text could not be made available for comparison.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file could not be read.
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The bytes are not decodable as text.
    #[error("text encoding error: {0}")]
    Encoding(String),
    /// The file type has no text extractor in this build.
    #[error("unsupported file type: '{extension}'; only plain text sources are supported")]
    Unsupported { extension: String },
}

/// Decode raw bytes into comparison-ready text.
///
/// UTF-8 is tried first; anything else is read as Latin-1, which maps every
/// byte to exactly one char. Line endings are folded to `\n` and surrounding
/// whitespace is trimmed.
pub fn decode_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.contains(&0) {
        return Err(ExtractionError::Encoding(
            "input contains NUL bytes and does not look like text".to_string(),
        ));
    }

    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(err) => {
            warn!(
                valid_up_to = err.valid_up_to(),
                "input is not valid UTF-8, decoding as Latin-1"
            );
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    };

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    Ok(text.trim().to_string())
}

/// Read and decode a document from disk.
///
/// `.txt` files and files without an extension are decoded as text; every
/// other extension is rejected as unsupported.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !matches!(extension.as_str(), "" | "txt" | "text") {
        return Err(ExtractionError::Unsupported { extension });
    }

    let bytes = fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_text(&bytes)
}
