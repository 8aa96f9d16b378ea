//! Extraction of the `==UserScript==` metadata block from resolved scripts.

use regex::Regex;

use crate::error::BundleError;

/// Extract the first metadata block from `document`, verbatim and including
/// both marker comment lines.
///
/// Matching is purely textual: the markers are recognised wherever the
/// comment lines occur, with no awareness of surrounding syntax.
pub fn extract(document: &str) -> Result<String, BundleError> {
  let block = Regex::new(r"(?s)//[ \t]*==UserScript==\n.*?//[ \t]*==/UserScript==\n")
    .expect("invalid metadata block regex");

  block
    .find(document)
    .map(|found| found.as_str().to_string())
    .ok_or(BundleError::MetadataBlockMissing)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_block_including_marker_lines() {
    let document = "\
var before = 1;\n\
// ==UserScript==\n\
// @name example\n\
// @version 1.0\n\
// ==/UserScript==\n\
var after = 2;\n";

    let meta = extract(document).unwrap();
    assert_eq!(
      meta,
      "// ==UserScript==\n// @name example\n// @version 1.0\n// ==/UserScript==\n"
    );
  }

  #[test]
  fn tolerates_whitespace_after_comment_slashes() {
    let document = "//  \t==UserScript==\n// @name x\n// \t==/UserScript==\n";
    let meta = extract(document).unwrap();
    assert_eq!(meta, document);
  }

  #[test]
  fn uses_first_block_when_several_are_present() {
    let document = "\
// ==UserScript==\n// @name first\n// ==/UserScript==\n\
// ==UserScript==\n// @name second\n// ==/UserScript==\n";

    let meta = extract(document).unwrap();
    assert!(meta.contains("@name first"));
    assert!(!meta.contains("@name second"));
  }

  #[test]
  fn missing_block_fails_with_not_found() {
    let err = extract("var x = 1;\n").unwrap_err();
    assert!(matches!(err, BundleError::MetadataBlockMissing));
  }
}
