//! The comment-marker transform that renders a workflow file inert.
//!
//! Disabling prefixes every line with [`COMMENT_MARKER`], so the YAML parser on
//! the Actions side sees nothing but comments. Enabling strips exactly that
//! prefix from every line.
//!
//! The disabled state is recognised structurally: a file is disabled when it is
//! non-empty and every line starts with the marker. Both transforms check the
//! state first and report [`Transform::Unchanged`] when the file is already
//! where the caller wants it, so repeated application never nests markers.
//!
//! For any non-empty content `c` that is not already disabled,
//! `enable(disable(c)) == c` byte for byte.

use crate::FileContent;

/// Prefix added to every line of a disabled file.
pub const COMMENT_MARKER: &[u8] = b"# ";

/// Result of applying a transform to file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// The content must be rewritten to this value.
    Changed(FileContent),
    /// The content is already in the requested state.
    Unchanged,
}

impl Transform {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// Splits content into lines, each keeping its terminating `\n` if any.
fn lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    content.split_inclusive(|b| *b == b'\n')
}

/// Returns `true` if every line of a non-empty file carries the marker.
pub fn is_disabled(content: &FileContent) -> bool {
    let bytes = content.as_bytes();
    !bytes.is_empty() && lines(bytes).all(|line| line.starts_with(COMMENT_MARKER))
}

/// Comments out every line of `content`.
pub fn disable(content: &FileContent) -> Transform {
    if content.is_empty() || is_disabled(content) {
        return Transform::Unchanged;
    }

    let bytes = content.as_bytes();
    let line_count = lines(bytes).count();
    let mut out = Vec::with_capacity(bytes.len() + line_count * COMMENT_MARKER.len());
    for line in lines(bytes) {
        out.extend_from_slice(COMMENT_MARKER);
        out.extend_from_slice(line);
    }
    Transform::Changed(FileContent::new(out))
}

/// Strips the marker added by [`disable`] from every line of `content`.
pub fn enable(content: &FileContent) -> Transform {
    if !is_disabled(content) {
        return Transform::Unchanged;
    }

    let bytes = content.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    for line in lines(bytes) {
        out.extend_from_slice(&line[COMMENT_MARKER.len()..]);
    }
    Transform::Changed(FileContent::new(out))
}
