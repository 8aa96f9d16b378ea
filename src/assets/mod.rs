//! Reading source-tree files as raw text, escaped strings or data URIs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};

use crate::error::BundleError;

pub mod css;

/// Capability to read files from the source tree by relative path.
///
/// Keeping the resolver behind this seam lets the substitution engine run
/// against an in-memory tree in tests.
pub trait AssetSource {
  /// Read a file as UTF-8 text.
  fn read_text(&self, path: &str) -> Result<String, BundleError>;
  /// Read a file as raw bytes.
  fn read_bytes(&self, path: &str) -> Result<Vec<u8>, BundleError>;
}

/// Filesystem-backed source rooted at the project directory.
#[derive(Debug)]
pub struct DirSource {
  root: PathBuf,
}

impl DirSource {
  /// Create a source resolving paths relative to `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl AssetSource for DirSource {
  fn read_text(&self, path: &str) -> Result<String, BundleError> {
    fs::read_to_string(self.root.join(path)).map_err(|err| BundleError::from_io(path, err))
  }

  fn read_bytes(&self, path: &str) -> Result<Vec<u8>, BundleError> {
    fs::read(self.root.join(path)).map_err(|err| BundleError::from_io(path, err))
  }
}

/// Loader over an [`AssetSource`] with per-invocation data-URI memoization.
///
/// Data URIs are cached by path so repeated references to the same image
/// across documents stay bounded by asset count rather than reference count.
pub struct AssetLoader<'a> {
  source: &'a dyn AssetSource,
  data_uris: RefCell<HashMap<String, String>>,
}

impl<'a> AssetLoader<'a> {
  /// Wrap an asset source.
  pub fn new(source: &'a dyn AssetSource) -> Self {
    Self {
      source,
      data_uris: RefCell::new(HashMap::new()),
    }
  }

  /// Underlying source, for callers that need plain reads.
  pub fn source(&self) -> &dyn AssetSource {
    self.source
  }

  /// Read a file verbatim as UTF-8 text.
  pub fn load_raw(&self, path: &str) -> Result<String, BundleError> {
    self.source.read_text(path)
  }

  /// Read a file and escape it for splicing into a single-quoted script
  /// string literal.
  pub fn load_escaped(&self, path: &str) -> Result<String, BundleError> {
    Ok(escape_single_quoted(&self.load_raw(path)?))
  }

  /// Read a file as bytes and encode it as a base64 `data:` URI.
  ///
  /// Only images are distinguished: `.svg` files get the `svg+xml` MIME
  /// subtype, everything else is labelled `png`.
  pub fn load_data_uri(&self, path: &str) -> Result<String, BundleError> {
    if let Some(cached) = self.data_uris.borrow().get(path) {
      return Ok(cached.clone());
    }

    let bytes = self.source.read_bytes(path)?;
    let subtype = if Path::new(path).extension().is_some_and(|ext| ext == "svg") {
      "svg+xml"
    } else {
      "png"
    };
    let uri = format!(
      "data:image/{subtype};base64,{}",
      general_purpose::STANDARD.encode(bytes)
    );

    self
      .data_uris
      .borrow_mut()
      .insert(path.to_string(), uri.clone());
    Ok(uri)
  }
}

/// Escape text so it survives inside a single-quoted script string: each
/// backslash is doubled, literal newlines become escaped newlines and single
/// quotes are escaped.
pub fn escape_single_quoted(text: &str) -> String {
  text
    .replace('\\', "\\\\")
    .replace('\n', "\\\n")
    .replace('\'', "\\'")
}

#[cfg(test)]
pub(crate) mod testing {
  use std::collections::HashMap;
  use std::io;

  use super::AssetSource;
  use crate::error::BundleError;

  /// In-memory asset tree used by engine tests.
  #[derive(Debug, Default)]
  pub struct MemSource {
    files: HashMap<String, Vec<u8>>,
  }

  impl MemSource {
    pub fn new() -> Self {
      Self::default()
    }

    pub fn insert(&mut self, path: &str, contents: impl Into<Vec<u8>>) -> &mut Self {
      self.files.insert(path.to_string(), contents.into());
      self
    }

    fn get(&self, path: &str) -> Result<&Vec<u8>, BundleError> {
      self.files.get(path).ok_or_else(|| {
        BundleError::from_io(path, io::Error::new(io::ErrorKind::NotFound, "no such file"))
      })
    }
  }

  impl AssetSource for MemSource {
    fn read_text(&self, path: &str) -> Result<String, BundleError> {
      let bytes = self.get(path)?.clone();
      String::from_utf8(bytes).map_err(|err| {
        BundleError::from_io(path, io::Error::new(io::ErrorKind::InvalidData, err))
      })
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, BundleError> {
      self.get(path).cloned()
    }
  }
}
