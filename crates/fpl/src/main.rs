mod cli;

use std::path::Path;

use clap::Parser as ClapParser;
use colored::*;
use fpl_config::{FplBuildConfig, FplConfig, FplProjectConfig};
use fpl_driver::{build_files, check_files};

use cli::{Cli, SubCommand};

const PROJECT_FILE: &str = "fpl.toml";

/// `fpl.toml` in the working directory, if there is one.
fn load_project_config() -> Result<Option<FplProjectConfig>, String> {
  let path = Path::new(PROJECT_FILE);
  if !path.exists() {
    return Ok(None);
  }

  let content = std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", PROJECT_FILE, e))?;
  let config = FplProjectConfig::from_toml(&content).map_err(|e| format!("Invalid '{}': {}", PROJECT_FILE, e))?;
  Ok(Some(config))
}

/// Stdlib sources first, then the files named on the command line, or the
/// project's sources when there are none.
fn source_files(
  cli_files: &[String],
  project: Option<&FplProjectConfig>,
) -> Vec<String> {
  let mut files = Vec::new();
  if let Some(project) = project {
    files.extend(project.build.stdlib.iter().cloned());
    if cli_files.is_empty() {
      files.extend(project.sources.iter().cloned());
    }
  }
  files.extend(cli_files.iter().cloned());
  files
}

fn parse_cli_to_config(cli: &Cli) -> Result<FplConfig, String> {
  let mut config = FplConfig::new_basic(
    cli.debug,
    cli.debug_trace.iter().copied().map(Into::into).collect(),
    cli.quiet,
    cli.verbose,
  );

  let project = load_project_config()?;
  let dump = cli.dump.iter().copied().map(Into::into).collect();

  let build_config = match &cli.subcommand {
    SubCommand::Build(build) => {
      let output = build
        .output
        .clone()
        .or_else(|| project.as_ref().and_then(|p| p.build.output.clone()));
      let stop_at = build
        .stop_at
        .map(Into::into)
        .or_else(|| project.as_ref().and_then(|p| p.build.stop_at))
        .unwrap_or_default();

      FplBuildConfig {
        files: source_files(&build.files, project.as_ref()),
        output,
        stop_at,
        dump,
        dump_dir: cli.dump_dir.clone(),
        symbol_map: build.symbol_map.clone(),
        check_mode: false,
      }
    },
    SubCommand::Check(check) => FplBuildConfig {
      files: source_files(&check.files, project.as_ref()),
      dump,
      dump_dir: cli.dump_dir.clone(),
      symbol_map: check.symbol_map.clone(),
      check_mode: true,
      ..FplBuildConfig::default()
    },
  };

  if build_config.files.is_empty() {
    return Err(format!(
      "No source files provided. Name them on the command line or list them in '{}'.",
      PROJECT_FILE
    ));
  }

  config.project_config = project;
  config.build_config = Some(build_config);
  Ok(config)
}

fn main() {
  let cli = Cli::parse();

  let config = match parse_cli_to_config(&cli) {
    Ok(config) => config,
    Err(message) => {
      eprintln!("{} {}", "Error:".red().bold(), message);
      eprintln!("For more information, run `fplc --help`");
      std::process::exit(1);
    },
  };

  let result = match &cli.subcommand {
    SubCommand::Build(_) => build_files(&config),
    SubCommand::Check(_) => check_files(&config),
  };

  if result.is_err() {
    std::process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn project_sources_fill_in_for_missing_files() {
    let project = FplProjectConfig::from_toml(
      r#"
name = "demo"
sources = ["main.fpl"]

[build]
stdlib = ["std/strings.fpl"]
"#,
    )
    .unwrap();

    assert_eq!(
      source_files(&[], Some(&project)),
      vec!["std/strings.fpl".to_string(), "main.fpl".to_string()]
    );
    assert_eq!(
      source_files(&["other.fpl".to_string()], Some(&project)),
      vec!["std/strings.fpl".to_string(), "other.fpl".to_string()]
    );
    assert_eq!(source_files(&["a.fpl".to_string()], None), vec!["a.fpl".to_string()]);
  }
}
