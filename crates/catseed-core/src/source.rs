//! Reading the category export from disk.
//!
//! Exports arrive from several tools, so the file is tried as UTF-8 with a
//! byte-order mark, plain UTF-8 and finally Latin-1. The first decoding that
//! also parses as a category tree wins.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::categories::CategoryNode;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const PREVIEW_BYTES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8Sig,
    Utf8,
    Latin1,
}

impl SourceEncoding {
    pub const ALL: [SourceEncoding; 3] = [
        SourceEncoding::Utf8Sig,
        SourceEncoding::Utf8,
        SourceEncoding::Latin1,
    ];

    /// Decode `bytes`, or `None` if they are not valid in this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            SourceEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            SourceEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            SourceEncoding::Latin1 => Some(bytes.iter().copied().map(char::from).collect()),
        }
    }
}

impl std::fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceEncoding::Utf8Sig => write!(f, "utf-8-sig"),
            SourceEncoding::Utf8 => write!(f, "utf-8"),
            SourceEncoding::Latin1 => write!(f, "latin-1"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("category file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read category file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("category file '{}' is empty", .0.display())]
    Empty(PathBuf),

    #[error(
        "could not parse category file '{path}' (tried {tried}): {reason}; first bytes: {preview_hex}"
    )]
    Unparseable {
        path: String,
        tried: String,
        reason: String,
        preview_hex: String,
    },
}

/// A parsed category tree plus what it took to read it.
#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub root: CategoryNode,
    pub encoding: SourceEncoding,
    pub bytes: u64,
}

/// Read and parse the category export at `path`.
///
/// # Errors
///
/// Returns [`SourceError::NotFound`] if the file does not exist,
/// [`SourceError::Empty`] if it is empty or whitespace-only, and
/// [`SourceError::Unparseable`] if no encoding yields a valid tree.
pub fn load_category_tree(path: &Path) -> Result<LoadedTree, SourceError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(SourceError::Io {
                path: path.display().to_string(),
                source: e,
            });
        }
    };

    tracing::info!(path = %path.display(), bytes = bytes.len(), "read category file");

    let (root, encoding) = parse_category_tree(&bytes).map_err(|err| match err {
        ParseFailure::Empty => SourceError::Empty(path.to_path_buf()),
        ParseFailure::Invalid { reason } => SourceError::Unparseable {
            path: path.display().to_string(),
            tried: SourceEncoding::ALL
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            reason,
            preview_hex: hex_preview(&bytes),
        },
    })?;

    tracing::info!(%encoding, "parsed category tree");

    Ok(LoadedTree {
        root,
        encoding,
        bytes: bytes.len() as u64,
    })
}

/// Why an in-memory export could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    Empty,
    Invalid { reason: String },
}

/// Parse an in-memory export, trying each [`SourceEncoding`] in turn.
///
/// # Errors
///
/// Returns [`ParseFailure::Empty`] for empty or whitespace-only input and
/// [`ParseFailure::Invalid`] with the last parse error otherwise.
pub fn parse_category_tree(bytes: &[u8]) -> Result<(CategoryNode, SourceEncoding), ParseFailure> {
    if bytes.is_empty() {
        return Err(ParseFailure::Empty);
    }

    let mut last_error = String::from("no encoding could decode the file");
    for encoding in SourceEncoding::ALL {
        let Some(text) = encoding.decode(bytes) else {
            last_error = format!("not valid {encoding}");
            continue;
        };
        if text.trim().is_empty() {
            return Err(ParseFailure::Empty);
        }
        match serde_json::from_str::<CategoryNode>(&text) {
            Ok(root) => return Ok((root, encoding)),
            Err(e) => {
                tracing::debug!(%encoding, error = %e, "category file did not parse");
                last_error = e.to_string();
            }
        }
    }

    Err(ParseFailure::Invalid { reason: last_error })
}

fn hex_preview(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(PREVIEW_BYTES * 2);
    for b in bytes.iter().take(PREVIEW_BYTES) {
        let _ = write!(out, "{b:02x}");
    }
    out
}
