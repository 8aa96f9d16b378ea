//! Immutable per-document values consumed by the token resolver.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Plugin name assigned to the single combined build artifact.
///
/// Individual plugins get additional setup boilerplate when their wrapper is
/// closed; the combined artifact boots itself and closes with the bare end
/// boilerplate instead.
pub const COMBINED_SCRIPT_NAME: &str = "total-conversion-build";

const DEFAULT_WRAPPER_START: &str = r#"function wrapper(plugin_info) {
// ensure plugin framework is there, even if the main script is not yet loaded
if(typeof window.plugin !== 'function') window.plugin = function() {};

// build metadata shown in the 'About' dialog
plugin_info.buildName = '@@BUILDNAME@@';
plugin_info.dateTimeVersion = '@@DATETIMEVERSION@@';
plugin_info.pluginId = '@@PLUGINNAME@@';

"#;

const DEFAULT_WRAPPER_SETUP: &str = r#"
setup.info = plugin_info; // add the script info data to the function as a property
if(!window.bootPlugins) window.bootPlugins = [];
window.bootPlugins.push(setup);
// if the main script has already booted, immediately run the 'setup' function
if(window.mainScriptLoaded && typeof setup === 'function') setup();
"#;

const DEFAULT_WRAPPER_END: &str = r#"
} // wrapper end
// inject code into site context
var script = document.createElement('script');
var info = {};
if (typeof GM_info !== 'undefined' && GM_info && GM_info.script) info.script = { version: GM_info.script.version, name: GM_info.script.name, description: GM_info.script.description };
script.appendChild(document.createTextNode('('+ wrapper +')('+JSON.stringify(info)+');'));
(document.body || document.head || document.documentElement).appendChild(script);
"#;

/// Boilerplate used to isolate injected plugin code within a combined script.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PluginWrapper {
  /// Opening boilerplate emitted for `@@PLUGINSTART@@`.
  pub start: String,
  /// Teardown registering the plugin's setup hook, prepended to `end` for
  /// individual plugins.
  pub setup: String,
  /// Closing boilerplate emitted for `@@PLUGINEND@@`.
  pub end: String,
}

impl Default for PluginWrapper {
  fn default() -> Self {
    Self {
      start: DEFAULT_WRAPPER_START.to_string(),
      setup: DEFAULT_WRAPPER_SETUP.to_string(),
      end: DEFAULT_WRAPPER_END.to_string(),
    }
  }
}

impl PluginWrapper {
  /// Variant of `start` that opens the wrapper function in strict mode.
  pub fn start_use_strict(&self) -> String {
    self.start.replacen("{\n", "{\n\"use strict\";\n", 1)
  }
}

/// UTC build timestamps rendered in the formats userscripts expect.
#[derive(Debug, Clone)]
pub struct BuildStamp {
  /// Human readable stamp, e.g. `2026-08-27-153012`.
  pub build_date: String,
  /// Userscript version form, e.g. `20260827.153012`. Userscript managers
  /// compare versions numerically, so leading zeros are stripped from the
  /// time component.
  pub datetime_version: String,
  /// Long form written to the `.build-timestamp` file.
  pub timestamp: String,
}

impl BuildStamp {
  /// Capture the current UTC time.
  pub fn now() -> Self {
    Self::from_datetime(Utc::now())
  }

  /// Render timestamps for a specific instant.
  pub fn from_datetime(now: DateTime<Utc>) -> Self {
    let time_part = now.format("%H%M%S").to_string();
    Self {
      build_date: now.format("%Y-%m-%d-%H%M%S").to_string(),
      datetime_version: format!("{}{}", now.format("%Y%m%d."), time_part.trim_start_matches('0')),
      timestamp: now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    }
  }
}

/// Everything known before substitution begins for one document.
///
/// Constructed once per document and never mutated; the resolver reads from
/// it but keeps no state of its own.
#[derive(Debug, Clone)]
pub struct BuildContext {
  /// Name of the build configuration being produced.
  pub build_name: String,
  /// Human readable UTC build date.
  pub build_date: String,
  /// Compact numeric version derived from the build date.
  pub datetime_version: String,
  /// Plugin name, present only when resolving a plugin document.
  pub plugin_name: Option<String>,
  /// Base URL for externally hosted resources, when configured.
  pub resource_url_base: Option<String>,
  /// Update URL stamped into this document's metadata block.
  pub update_url: String,
  /// Download URL stamped into this document's metadata block.
  pub download_url: String,
  /// Wrapper boilerplate for isolating injected plugin code.
  pub wrapper: PluginWrapper,
}

impl BuildContext {
  /// Replacement for `@@PLUGINEND@@`.
  ///
  /// The combined build artifact closes with the bare end boilerplate; every
  /// other plugin also registers its setup hook.
  pub fn plugin_end(&self) -> String {
    if self.plugin_name.as_deref() == Some(COMBINED_SCRIPT_NAME) {
      self.wrapper.end.clone()
    } else {
      format!("{}{}", self.wrapper.setup, self.wrapper.end)
    }
  }
}
