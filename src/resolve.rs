//! Single-pass placeholder token resolution over template documents.

use regex::Regex;

use crate::assets::{AssetLoader, css};
use crate::context::BuildContext;
use crate::error::BundleError;
use crate::modules;

/// Fixed two-line metadata header substituted for `@@METAINFO@@`. The URL
/// tokens it introduces are resolved by the later URL passes.
const META_BLOCK: &str = "// @updateURL      @@UPDATEURL@@\n// @downloadURL    @@DOWNLOADURL@@";

/// Character set allowed in a parametric marker's path argument.
const INCLUDE_ARG: &str = "[0-9a-zA-Z_./-]+";

/// Bare placeholder tokens understood by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
  /// `@@INJECTCODE@@` — aggregated module blob.
  InjectCode,
  /// `@@METAINFO@@` — update/download metadata header lines.
  MetaInfo,
  /// `@@PLUGINSTART@@` — wrapper opening boilerplate.
  PluginStart,
  /// `@@PLUGINSTART-USE-STRICT@@` — wrapper opening in strict mode.
  PluginStartUseStrict,
  /// `@@PLUGINEND@@` — wrapper closing boilerplate.
  PluginEnd,
  /// `@@BUILDDATE@@` — human readable UTC build date.
  BuildDate,
  /// `@@DATETIMEVERSION@@` — compact numeric version stamp.
  DateTimeVersion,
  /// `@@RESOURCEURLBASE@@` — base URL for externally hosted resources.
  ResourceUrlBase,
  /// `@@BUILDNAME@@` — name of the build configuration.
  BuildName,
  /// `@@UPDATEURL@@` — per-document update URL.
  UpdateUrl,
  /// `@@DOWNLOADURL@@` — per-document download URL.
  DownloadUrl,
  /// `@@PLUGINNAME@@` — name of the plugin being resolved.
  PluginName,
}

impl Token {
  /// Marker string as it appears in template documents.
  pub const fn marker(self) -> &'static str {
    match self {
      Self::InjectCode => "@@INJECTCODE@@",
      Self::MetaInfo => "@@METAINFO@@",
      Self::PluginStart => "@@PLUGINSTART@@",
      Self::PluginStartUseStrict => "@@PLUGINSTART-USE-STRICT@@",
      Self::PluginEnd => "@@PLUGINEND@@",
      Self::BuildDate => "@@BUILDDATE@@",
      Self::DateTimeVersion => "@@DATETIMEVERSION@@",
      Self::ResourceUrlBase => "@@RESOURCEURLBASE@@",
      Self::BuildName => "@@BUILDNAME@@",
      Self::UpdateUrl => "@@UPDATEURL@@",
      Self::DownloadUrl => "@@DOWNLOADURL@@",
      Self::PluginName => "@@PLUGINNAME@@",
    }
  }
}

/// Parametric include markers, keyed by a path argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Include {
  Raw,
  Escaped,
  Css,
  Image,
}

impl Include {
  const fn keyword(self) -> &'static str {
    match self {
      Self::Raw => "INCLUDERAW",
      Self::Escaped => "INCLUDESTRING",
      Self::Css => "INCLUDECSS",
      Self::Image => "INCLUDEIMAGE",
    }
  }
}

/// Resolve every placeholder token in `document` against the build context
/// and source tree.
///
/// Passes are applied in a fixed order because earlier substitutions may
/// introduce text containing tokens of later classes (the wrapper
/// boilerplate carries `@@BUILDNAME@@`, the metadata header carries the URL
/// tokens). A document without tokens passes through unchanged. The module
/// blob is aggregated only when `@@INJECTCODE@@` actually occurs.
///
/// `@@RESOURCEURLBASE@@` with no configured base is a hard error; a missing
/// include target propagates the loader's not-found error. `@@PLUGINNAME@@`
/// is left alone when the context carries no plugin name.
pub fn resolve(
  document: &str,
  ctx: &BuildContext,
  loader: &AssetLoader<'_>,
  module_paths: &[String],
) -> Result<String, BundleError> {
  let mut script = document.to_string();

  if script.contains(Token::InjectCode.marker()) {
    let injected = modules::aggregate(loader.source(), module_paths)?;
    script = script.replace(Token::InjectCode.marker(), &injected);
  }

  script = script.replace(Token::MetaInfo.marker(), META_BLOCK);
  script = script.replace(Token::PluginStart.marker(), &ctx.wrapper.start);
  script = script.replace(
    Token::PluginStartUseStrict.marker(),
    &ctx.wrapper.start_use_strict(),
  );
  script = script.replace(Token::PluginEnd.marker(), &ctx.plugin_end());

  for include in [Include::Raw, Include::Escaped, Include::Css, Include::Image] {
    script = substitute_includes(&script, include, loader)?;
  }

  script = script.replace(Token::BuildDate.marker(), &ctx.build_date);
  script = script.replace(Token::DateTimeVersion.marker(), &ctx.datetime_version);

  script = match &ctx.resource_url_base {
    Some(base) => script.replace(Token::ResourceUrlBase.marker(), base),
    None if script.contains(Token::ResourceUrlBase.marker()) => {
      return Err(BundleError::ResourceUrlBaseUnset);
    }
    None => script,
  };

  script = script.replace(Token::BuildName.marker(), &ctx.build_name);
  script = script.replace(Token::UpdateUrl.marker(), &ctx.update_url);
  script = script.replace(Token::DownloadUrl.marker(), &ctx.download_url);

  if let Some(name) = &ctx.plugin_name {
    script = script.replace(Token::PluginName.marker(), name);
  }

  Ok(script)
}

fn substitute_includes(
  script: &str,
  include: Include,
  loader: &AssetLoader<'_>,
) -> Result<String, BundleError> {
  let marker = Regex::new(&format!("@@{}:({INCLUDE_ARG})@@", include.keyword()))
    .expect("invalid include regex");

  let mut out = String::with_capacity(script.len());
  let mut last = 0;
  for caps in marker.captures_iter(script) {
    let whole = caps.get(0).expect("match without full capture");
    let path = &caps[1];
    let replacement = match include {
      Include::Raw => loader.load_raw(path)?,
      Include::Escaped => loader.load_escaped(path)?,
      Include::Css => css::rewrite_css(loader, path)?,
      Include::Image => loader.load_data_uri(path)?,
    };
    out.push_str(&script[last..whole.start()]);
    out.push_str(&replacement);
    last = whole.end();
  }
  out.push_str(&script[last..]);
  Ok(out)
}
