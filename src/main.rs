//! Command line front end for the userscript bundler.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use userscript_bundler::builder::UserscriptBuilder;
use userscript_bundler::settings::{DEFAULT_SETTINGS_FILE, SettingsFile};

#[derive(Debug, Parser)]
#[command(name = "userscript-bundler", version, about = "Assemble userscript bundles")]
struct Cli {
  /// Name of the build configuration; falls back to the settings file's
  /// default build.
  build_name: Option<String>,

  /// Settings file describing the available builds.
  #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
  settings: PathBuf,

  /// Source tree containing main.js, code/ and plugins/.
  #[arg(long, default_value = ".")]
  source: PathBuf,

  /// Directory receiving one sub-directory per build.
  #[arg(long, default_value = "build")]
  out: PathBuf,
}

fn main() -> ExitCode {
  match run(Cli::parse()) {
    Ok(code) => code,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<ExitCode> {
  let settings = SettingsFile::load(&cli.settings)?;

  let build_name = cli.build_name.or_else(|| settings.default_build.clone());
  let Some(build_name) = build_name else {
    eprintln!("Usage: userscript-bundler <BUILD_NAME>");
    eprintln!(" available build names: {}", settings.available_builds());
    return Ok(ExitCode::FAILURE);
  };

  let Some(build) = settings.get(&build_name) else {
    eprintln!("unknown build name: {build_name}");
    eprintln!(" available build names: {}", settings.available_builds());
    return Ok(ExitCode::FAILURE);
  };

  let out_dir = cli.out.join(&build_name);
  let report = UserscriptBuilder::new(&cli.source, &out_dir, &build_name, build).run()?;

  println!(
    "built {} (version {}, {} plugin{}) -> {}",
    build_name,
    report.datetime_version,
    report.plugin_count,
    if report.plugin_count == 1 { "" } else { "s" },
    report.out_dir.display()
  );
  Ok(ExitCode::SUCCESS)
}
