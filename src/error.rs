//! Error types surfaced by the substitution engine.

use std::io;

/// Errors produced while resolving a template document.
#[derive(Debug)]
pub enum BundleError {
  /// A referenced include, image or module file does not exist.
  AssetNotFound {
    /// Path that was referenced.
    path: String,
    /// Source I/O error.
    source: io::Error,
  },
  /// Reading a referenced file failed for a reason other than absence.
  AssetIo {
    /// Path that was being read.
    path: String,
    /// Source I/O error.
    source: io::Error,
  },
  /// `@@RESOURCEURLBASE@@` appears in a document but no base URL is configured.
  ResourceUrlBaseUnset,
  /// The document carries no `==UserScript==` metadata block.
  MetadataBlockMissing,
}

impl BundleError {
  /// Classify an I/O failure for `path` into the not-found or generic kind.
  pub(crate) fn from_io(path: &str, source: io::Error) -> Self {
    if source.kind() == io::ErrorKind::NotFound {
      Self::AssetNotFound {
        path: path.to_string(),
        source,
      }
    } else {
      Self::AssetIo {
        path: path.to_string(),
        source,
      }
    }
  }
}

impl std::fmt::Display for BundleError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::AssetNotFound { path, .. } => {
        write!(f, "referenced file not found: {path}")
      }
      Self::AssetIo { path, source } => {
        write!(f, "failed to read {path}: {source}")
      }
      Self::ResourceUrlBaseUnset => {
        write!(
          f,
          "'@@RESOURCEURLBASE@@' found in script, but no replacement defined"
        )
      }
      Self::MetadataBlockMissing => {
        write!(f, "no ==UserScript== metadata block found in script")
      }
    }
  }
}

impl std::error::Error for BundleError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::AssetNotFound { source, .. } | Self::AssetIo { source, .. } => Some(source),
      _ => None,
    }
  }
}
