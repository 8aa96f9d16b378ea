//! Build settings file loader describing per-build URL configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::context::PluginWrapper;

/// Default settings file name searched for in the source tree.
pub const DEFAULT_SETTINGS_FILE: &str = "buildsettings.json";

/// Configuration for a single named build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildSettings {
  /// Base URL substituted for `@@RESOURCEURLBASE@@`; builds that reference
  /// the marker without configuring this fail hard.
  pub resource_url_base: Option<String>,
  /// Base URL under which the finished bundle is published. When absent the
  /// update/download URLs become the literal `none`.
  pub dist_url_base: Option<String>,
  /// Optional path to a JSON file overriding the plugin wrapper boilerplate.
  pub plugin_wrapper: Option<String>,
  /// Shell commands run before the build starts.
  pub pre_build: Vec<String>,
  /// Shell commands run after the build completes.
  pub post_build: Vec<String>,
}

/// Parsed settings file: a map of build names plus an optional default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsFile {
  /// Build selected when the command line names none.
  pub default_build: Option<String>,
  /// Available build configurations by name.
  pub builds: BTreeMap<String, BuildSettings>,
}

impl SettingsFile {
  /// Load and parse a settings file.
  pub fn load(path: &Path) -> Result<Self> {
    let contents = fs::read_to_string(path)
      .with_context(|| format!("failed to read settings file {}", path.display()))?;
    serde_json::from_str(&contents)
      .with_context(|| format!("failed to parse settings file {}", path.display()))
  }

  /// Look up a build configuration by name.
  pub fn get(&self, build_name: &str) -> Option<&BuildSettings> {
    self.builds.get(build_name)
  }

  /// Comma-separated list of configured build names, for usage messages.
  pub fn available_builds(&self) -> String {
    self
      .builds
      .keys()
      .map(String::as_str)
      .collect::<Vec<_>>()
      .join(", ")
  }
}

impl BuildSettings {
  /// Resolve the wrapper boilerplate for this build, reading the configured
  /// wrapper file relative to `source_root` or falling back to the default.
  pub fn load_wrapper(&self, source_root: &Path) -> Result<PluginWrapper> {
    let Some(wrapper_path) = &self.plugin_wrapper else {
      return Ok(PluginWrapper::default());
    };

    let full = source_root.join(wrapper_path);
    let contents = fs::read_to_string(&full)
      .with_context(|| format!("failed to read plugin wrapper {}", full.display()))?;
    serde_json::from_str(&contents)
      .with_context(|| format!("failed to parse plugin wrapper {}", full.display()))
  }
}
