//! Inlining of `url(...)` references within stylesheets.

use regex::Regex;

use crate::assets::{AssetLoader, escape_single_quoted};
use crate::error::BundleError;

/// Load a stylesheet, replace every `url(...)` reference with an inlined
/// data URI and escape the result for a single-quoted string context.
///
/// References whose path contains `#` are left untouched: the fragment would
/// not survive inlining, so such entries keep pointing at the original file.
pub fn rewrite_css(loader: &AssetLoader<'_>, path: &str) -> Result<String, BundleError> {
  let css = loader.load_raw(path)?;
  let rewritten = inline_url_references(loader, &css)?;
  Ok(escape_single_quoted(&rewritten))
}

fn inline_url_references(loader: &AssetLoader<'_>, css: &str) -> Result<String, BundleError> {
  let reference = Regex::new(r#"url\(["']?([^)#]+?)["']?\)"#).expect("invalid url() regex");

  let mut out = String::with_capacity(css.len());
  let mut last = 0;
  for caps in reference.captures_iter(css) {
    let whole = caps.get(0).expect("match without full capture");
    out.push_str(&css[last..whole.start()]);
    out.push_str("url(");
    out.push_str(&loader.load_data_uri(&caps[1])?);
    out.push(')');
    last = whole.end();
  }
  out.push_str(&css[last..]);
  Ok(out)
}

#[cfg(test)]
mod tests {
  use base64::{Engine as _, engine::general_purpose};

  use super::*;
  use crate::assets::testing::MemSource;

  fn png_data_uri(bytes: &[u8]) -> String {
    format!(
      "data:image/png;base64,{}",
      general_purpose::STANDARD.encode(bytes)
    )
  }

  #[test]
  fn inlines_plain_and_quoted_references() {
    let mut source = MemSource::new();
    source.insert("style.css", "a { background: url(foo.png); b: url('bar.png'); }");
    source.insert("foo.png", vec![1u8]);
    source.insert("bar.png", vec![2u8]);

    let loader = AssetLoader::new(&source);
    let result = rewrite_css(&loader, "style.css").unwrap();

    assert!(result.contains(&format!("url({})", png_data_uri(&[1u8]))));
    assert!(result.contains(&format!("url({})", png_data_uri(&[2u8]))));
    assert!(!result.contains("foo.png"));
  }

  #[test]
  fn leaves_fragment_references_unchanged() {
    let mut source = MemSource::new();
    source.insert("style.css", "a { mask: url(sprite.svg#icon); }");
    source.insert("sprite.svg", "<svg/>".as_bytes());

    let loader = AssetLoader::new(&source);
    let result = rewrite_css(&loader, "style.css").unwrap();

    assert!(result.contains("url(sprite.svg#icon)"));
    assert!(!result.contains("data:image"));
  }

  #[test]
  fn escapes_rewritten_stylesheet_for_string_context() {
    let mut source = MemSource::new();
    source.insert("style.css", "a::before { content: 'x';\n}");

    let loader = AssetLoader::new(&source);
    let result = rewrite_css(&loader, "style.css").unwrap();

    assert_eq!(result, "a::before { content: \\'x\\';\\\n}");
  }

  #[test]
  fn missing_referenced_image_propagates() {
    let mut source = MemSource::new();
    source.insert("style.css", "a { background: url(gone.png); }");

    let loader = AssetLoader::new(&source);
    let err = rewrite_css(&loader, "style.css").unwrap_err();
    assert!(matches!(err, BundleError::AssetNotFound { ref path, .. } if path == "gone.png"));
  }
}
