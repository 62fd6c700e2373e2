//! Base64 transport encoding of file content.
//!
//! GitHub wraps the `content` field of file responses at 60 columns; the
//! decoder drops that whitespace before decoding. Encoding emits a single
//! unwrapped line, which the PUT endpoint accepts.

use base64::{engine::general_purpose::STANDARD, Engine};
use toggle::{FileContent, StoreError};

pub(crate) fn encode(content: &FileContent) -> String {
    STANDARD.encode(content.as_bytes())
}

pub(crate) fn decode(encoded: &str) -> Result<FileContent, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map(FileContent::new)
        .map_err(|e| StoreError::Decode {
            message: format!("invalid base64 content: {e}"),
        })
}
