//! Clients for the external collaborators: the bucket object store and the
//! Drive archival gateway.

pub mod archive;
pub mod storage;

pub use archive::{ArchiveClient, ArchiveResult, ArchiveUpload};
pub use storage::StorageClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Strip everything but letters, digits and spaces, matching the filename
/// convention used in the Drive archive.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

/// Make a filename safe for an object-store path segment.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_name_keeps_letters_digits_spaces() {
        assert_eq!(sanitize_name("Fire Safety (v2)!"), "Fire Safety v2");
    }

    #[test]
    fn sanitize_filename_replaces_specials() {
        assert_eq!(sanitize_filename("quiz sheet v2.pdf"), "quiz_sheet_v2.pdf");
    }
}
