//! Aggregation of standalone code modules into a single injected blob.

use std::fs;
use std::io;
use std::path::Path;

use crate::assets::AssetSource;
use crate::error::BundleError;

/// Separator joining wrapped modules. The lone semicolon stops a syntax
/// error in one module from silently merging with the next statement of the
/// previous one.
pub const MODULE_SEPARATOR: &str = "\n\n;\n\n";

/// Wrap each module in an isolating IIFE and join them into one blob.
///
/// `paths` must already be in the order the modules should appear; an empty
/// list yields an empty string. Module boundaries preserve each module's
/// content byte for byte.
pub fn aggregate(source: &dyn AssetSource, paths: &[String]) -> Result<String, BundleError> {
  let mut wrapped = Vec::with_capacity(paths.len());
  for path in paths {
    wrapped.push(wrap_module(path, &source.read_text(path)?));
  }
  Ok(wrapped.join(MODULE_SEPARATOR))
}

/// Discover `.js` module files directly under `dir`, sorted lexicographically
/// so aggregation order never depends on directory-listing order.
pub fn discover(root: &Path, dir: &str) -> io::Result<Vec<String>> {
  let full = root.join(dir);
  if !full.is_dir() {
    return Ok(Vec::new());
  }

  let mut paths = Vec::new();
  for entry in fs::read_dir(&full)? {
    let entry = entry?;
    if !entry.file_type()?.is_file() {
      continue;
    }

    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };
    if name.ends_with(".js") {
      paths.push(format!("{dir}/{name}"));
    }
  }

  paths.sort();
  Ok(paths)
}

fn wrap_module(path: &str, body: &str) -> String {
  let name = module_name(path);
  format!(
    "\n// *** module: {path} ***\n(function () {{\nvar log = ulog('{name}');\n{body}\n}})();\n"
  )
}

/// Bare module name: the file name without its extension.
fn module_name(path: &str) -> &str {
  let file = path.rsplit('/').next().unwrap_or(path);
  file.rsplit_once('.').map_or(file, |(stem, _)| stem)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assets::testing::MemSource;
  use tempfile::tempdir;

  #[test]
  fn empty_input_yields_empty_string() {
    let source = MemSource::new();
    assert_eq!(aggregate(&source, &[]).unwrap(), "");
  }

  #[test]
  fn wraps_each_module_and_preserves_bodies() {
    let mut source = MemSource::new();
    source.insert("code/alpha.js", "window.alpha = 1;");
    source.insert("code/beta.js", "window.beta = 2;");

    let paths = vec!["code/alpha.js".to_string(), "code/beta.js".to_string()];
    let blob = aggregate(&source, &paths).unwrap();

    assert_eq!(blob.matches("(function () {").count(), paths.len());
    assert!(blob.contains("// *** module: code/alpha.js ***"));
    assert!(blob.contains("var log = ulog('alpha');"));
    assert!(blob.contains("window.alpha = 1;"));
    assert!(blob.contains("var log = ulog('beta');"));
    assert!(blob.contains("window.beta = 2;"));
    assert_eq!(blob.matches(MODULE_SEPARATOR).count(), 1);
  }

  #[test]
  fn missing_module_propagates_not_found() {
    let source = MemSource::new();
    let err = aggregate(&source, &["code/gone.js".to_string()]).unwrap_err();
    assert!(matches!(err, BundleError::AssetNotFound { ref path, .. } if path == "code/gone.js"));
  }

  #[test]
  fn discovers_modules_in_sorted_order() {
    let dir = tempdir().unwrap();
    let code = dir.path().join("code");
    fs::create_dir_all(&code).unwrap();
    fs::write(code.join("zeta.js"), "z").unwrap();
    fs::write(code.join("alpha.js"), "a").unwrap();
    fs::write(code.join("notes.txt"), "skip me").unwrap();

    let paths = discover(dir.path(), "code").unwrap();
    assert_eq!(paths, vec!["code/alpha.js", "code/zeta.js"]);
  }

  #[test]
  fn discover_tolerates_missing_directory() {
    let dir = tempdir().unwrap();
    assert!(discover(dir.path(), "code").unwrap().is_empty());
  }
}
