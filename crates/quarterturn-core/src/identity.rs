//! Thumbnail identity resolution.
//!
//! Every piece of per-image state is keyed by an [`IdentityKey`] derived from
//! the thumbnail's static attributes. The derivation lives here and nowhere
//! else so that the same thumbnail always lands on the same key.
//!
//! # Derivation Priority
//!
//! 1. Explicit server filename (e.g. `data-image-filename`)
//! 2. Basename of the source path plus the assigned index: `"{basename}#{index}"`
//! 3. The assigned index alone
//!
//! A thumbnail with none of these cannot be keyed and does not take part in
//! selection or commit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A handle to a displayed thumbnail.
///
/// Created once when the page's thumbnails are enumerated and never mutated
/// afterwards. The image the element currently shows is tracked separately by
/// the session, so a replaced display source never changes the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailRef {
    /// Server-assigned filename, if the element carries one.
    pub filename: Option<String>,
    /// Source path or URL of the image.
    pub src: String,
    /// Stable per-element index, assigned in document order.
    pub index: Option<usize>,
}

impl ThumbnailRef {
    /// Create a thumbnail handle without an assigned index.
    pub fn new(filename: Option<String>, src: impl Into<String>) -> Self {
        Self {
            filename: filename.filter(|name| !name.is_empty()),
            src: src.into(),
            index: None,
        }
    }

    /// Return a copy with the given per-element index.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Basename of the source path with any query string removed.
    pub fn basename(&self) -> &str {
        basename(&self.src)
    }

    /// The filename sent to the backend for this thumbnail.
    ///
    /// Unlike the identity key this never carries an index suffix: the server
    /// only knows about explicit filenames and source basenames. The index is
    /// used only as a last resort.
    pub fn request_filename(&self) -> Option<String> {
        if let Some(name) = &self.filename {
            return Some(name.clone());
        }
        let base = self.basename();
        if !base.is_empty() {
            return Some(base.to_string());
        }
        self.index.map(|index| index.to_string())
    }
}

/// Stable string identifying one thumbnail for the duration of a page session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append the index to make a colliding key unique.
    pub(crate) fn disambiguate(&self, index: usize) -> Self {
        Self(format!("{}#{}", self.0, index))
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Resolve the identity key of a thumbnail.
///
/// Pure and deterministic given the thumbnail's filename, source path and
/// assigned index. Returns `None` when none of them yields a usable key.
pub fn resolve(thumbnail: &ThumbnailRef) -> Option<IdentityKey> {
    if let Some(name) = &thumbnail.filename {
        return Some(IdentityKey::new(name.as_str()));
    }

    let base = thumbnail.basename();
    match (base.is_empty(), thumbnail.index) {
        (false, Some(index)) => Some(IdentityKey::new(format!("{base}#{index}"))),
        (false, None) => Some(IdentityKey::new(base)),
        (true, Some(index)) => Some(IdentityKey::new(index.to_string())),
        (true, None) => None,
    }
}

/// Return the final path segment of a URL or filesystem path.
///
/// Any query string or fragment is stripped first, so
/// `/thumbs/a.jpg?v=123` yields `a.jpg`. A path ending in `/` yields an
/// empty string.
pub fn basename(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default()
}
