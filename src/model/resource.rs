//! Content-addressed binary resources
//!
//! A resource's filename is derived from a SHA-256 digest of its bytes, so the
//! same image embedded in many chapters always lands at the same path and a
//! sink keyed by filename stores it once.

use sha2::{Digest, Sha256};
use std::fmt;

/// Directory inside the book where resources are placed
pub const RESOURCE_DIR: &str = "images";

/// A binary asset (usually an image) referenced from chapter content
#[derive(Clone, PartialEq, Eq)]
pub struct Resource {
    content: Vec<u8>,
    mime_type: String,
    extension: String,
    filename: String,
}

impl Resource {
    /// Creates a resource and derives its filename from the content digest
    ///
    /// The extension is stored lowercased without a leading dot.
    pub fn new(content: Vec<u8>, mime_type: impl Into<String>, extension: &str) -> Self {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        let digest = hex::encode(Sha256::digest(&content));

        let filename = if extension.is_empty() {
            format!("{}/{}", RESOURCE_DIR, digest)
        } else {
            format!("{}/{}.{}", RESOURCE_DIR, digest, extension)
        };

        Self {
            content,
            mime_type: mime_type.into(),
            extension,
            filename,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the resource inside the book, relative to the content root
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Returns the lowercased extension of the last path segment, if any
pub fn extension_of(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next()?;
    let (stem, extension) = segment.rsplit_once('.')?;

    if stem.is_empty() || extension.is_empty() {
        return None;
    }

    Some(extension.to_ascii_lowercase())
}

/// Guesses a MIME type from a path's extension
///
/// Only image types are known; anything else yields `None`.
pub fn guess_mime_type(path: &str) -> Option<&'static str> {
    let mime = match extension_of(path)?.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/vnd.microsoft.icon",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}
