//! Build orchestration: resolves each document and lays out the output tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::assets::{AssetLoader, DirSource};
use crate::context::{BuildContext, BuildStamp, COMBINED_SCRIPT_NAME};
use crate::meta;
use crate::modules;
use crate::resolve;
use crate::settings::BuildSettings;

/// File name of the combined build artifact written at the output root.
pub const COMBINED_SCRIPT_FILE: &str = "total-conversion-build.user.js";

const MAIN_TEMPLATE: &str = "main.js";
const MODULES_DIR: &str = "code";
const PLUGINS_DIR: &str = "plugins";
const TIMESTAMP_FILE: &str = ".build-timestamp";

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
  /// Directory the bundle was written to.
  pub out_dir: PathBuf,
  /// Number of plugin documents resolved, combined artifact excluded.
  pub plugin_count: usize,
  /// Version stamp applied to every document of this build.
  pub datetime_version: String,
}

/// Drives one build invocation: main script, plugins, metadata siblings and
/// the build timestamp, with pre/post hooks around the lot.
pub struct UserscriptBuilder<'a> {
  source_root: &'a Path,
  out_dir: &'a Path,
  build_name: &'a str,
  settings: &'a BuildSettings,
}

impl<'a> UserscriptBuilder<'a> {
  /// Create a builder reading templates from `source_root` and writing the
  /// finished bundle to `out_dir`.
  pub fn new(
    source_root: &'a Path,
    out_dir: &'a Path,
    build_name: &'a str,
    settings: &'a BuildSettings,
  ) -> Self {
    Self {
      source_root,
      out_dir,
      build_name,
      settings,
    }
  }

  /// Run the build. Any failure aborts the whole invocation; no partially
  /// resolved document is ever persisted.
  pub fn run(&self) -> Result<BuildReport> {
    run_hooks(&self.settings.pre_build, "preBuild")?;

    let stamp = BuildStamp::now();
    let wrapper = self.settings.load_wrapper(self.source_root)?;
    let source = DirSource::new(self.source_root);
    let loader = AssetLoader::new(&source);
    let module_paths = modules::discover(self.source_root, MODULES_DIR)
      .with_context(|| format!("failed to list modules under {MODULES_DIR}/"))?;

    fs::create_dir_all(self.out_dir)
      .with_context(|| format!("failed to create {}", self.out_dir.display()))?;

    let context = |plugin_name: String, relative: &str| {
      let (update_url, download_url) =
        distribution_urls(self.settings.dist_url_base.as_deref(), relative);
      BuildContext {
        build_name: self.build_name.to_string(),
        build_date: stamp.build_date.clone(),
        datetime_version: stamp.datetime_version.clone(),
        plugin_name: Some(plugin_name),
        resource_url_base: self.settings.resource_url_base.clone(),
        update_url,
        download_url,
        wrapper: wrapper.clone(),
      }
    };

    let main = loader
      .load_raw(MAIN_TEMPLATE)
      .with_context(|| format!("failed to load {MAIN_TEMPLATE}"))?;
    let ctx = context(COMBINED_SCRIPT_NAME.to_string(), COMBINED_SCRIPT_FILE);
    let resolved = resolve::resolve(&main, &ctx, &loader, &module_paths)
      .with_context(|| format!("failed to resolve {MAIN_TEMPLATE}"))?;
    self.save_script_and_meta(COMBINED_SCRIPT_FILE, &resolved)?;

    fs::write(self.out_dir.join(TIMESTAMP_FILE), &stamp.timestamp)
      .with_context(|| format!("failed to write {TIMESTAMP_FILE}"))?;

    let plugins = discover_plugins(self.source_root)?;
    if !plugins.is_empty() {
      fs::create_dir_all(self.out_dir.join(PLUGINS_DIR))
        .with_context(|| format!("failed to create {PLUGINS_DIR} output directory"))?;
    }

    for relative in &plugins {
      let template = loader
        .load_raw(relative)
        .with_context(|| format!("failed to load {relative}"))?;
      let ctx = context(plugin_name_from(relative), relative);
      let resolved = resolve::resolve(&template, &ctx, &loader, &module_paths)
        .with_context(|| format!("failed to resolve {relative}"))?;
      self.save_script_and_meta(relative, &resolved)?;
    }

    run_hooks(&self.settings.post_build, "postBuild")?;

    Ok(BuildReport {
      out_dir: self.out_dir.to_path_buf(),
      plugin_count: plugins.len(),
      datetime_version: stamp.datetime_version,
    })
  }

  /// Persist a resolved document, and its extracted metadata block under the
  /// `.meta.js` sibling name when that differs from the script name.
  fn save_script_and_meta(&self, relative: &str, script: &str) -> Result<()> {
    let target = self.out_dir.join(relative);
    if let Some(parent) = target.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&target, script)
      .with_context(|| format!("failed to write {}", target.display()))?;

    let meta_relative = relative.replace(".user.js", ".meta.js");
    if meta_relative != relative {
      let block =
        meta::extract(script).with_context(|| format!("while extracting metadata of {relative}"))?;
      let meta_target = self.out_dir.join(&meta_relative);
      fs::write(&meta_target, block)
        .with_context(|| format!("failed to write {}", meta_target.display()))?;
    }

    Ok(())
  }
}

/// Update and download URLs for a document published at `relative` beneath
/// the distribution base, or the literal `none` when no base is configured.
fn distribution_urls(dist_url_base: Option<&str>, relative: &str) -> (String, String) {
  match dist_url_base {
    Some(base) => {
      let download = format!("{base}/{relative}");
      let update = download.replace(".user.js", ".meta.js");
      (update, download)
    }
    None => ("none".to_string(), "none".to_string()),
  }
}

/// Plugin templates under `plugins/`, sorted for deterministic processing.
fn discover_plugins(source_root: &Path) -> Result<Vec<String>> {
  let dir = source_root.join(PLUGINS_DIR);
  if !dir.is_dir() {
    return Ok(Vec::new());
  }

  let mut plugins = Vec::new();
  for entry in
    fs::read_dir(&dir).with_context(|| format!("failed to read {}", dir.display()))?
  {
    let entry = entry?;
    if !entry.file_type()?.is_file() {
      continue;
    }

    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };
    if name.ends_with(".user.js") {
      plugins.push(format!("{PLUGINS_DIR}/{name}"));
    }
  }

  plugins.sort();
  Ok(plugins)
}

/// Plugin name from its template path: the file name with both the `.js`
/// and `.user` extensions stripped.
fn plugin_name_from(relative: &str) -> String {
  let file = relative.rsplit('/').next().unwrap_or(relative);
  let stem = Path::new(file)
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| file.to_string());
  Path::new(&stem)
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or(stem)
}

fn run_hooks(commands: &[String], stage: &str) -> Result<()> {
  for command in commands {
    let status = Command::new("sh")
      .arg("-c")
      .arg(command)
      .status()
      .with_context(|| format!("failed to run {stage} command `{command}`"))?;
    if !status.success() {
      bail!("{stage} command `{command}` exited with {status}");
    }
  }
  Ok(())
}
