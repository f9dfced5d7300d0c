use anyhow::Result;
use clap::{CommandFactory as _, Parser, Subcommand};

pub mod commands;
pub mod config;
pub mod manifest;
pub mod resolver;
pub mod template;
mod texts;
pub mod utils;

use crate::config::{AppContext, load_config};

/// create-sea-js - Scaffold a new sea-js-ui-core project in your command line.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
  /// Name of the project directory to create
  project_name: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
  /// Create a new sea-js-ui-core project
  Create { project_name: String },
}

impl Cli {
  /// Project name from either `create <name>` or the bare `<name>` shorthand.
  fn target_name(&self) -> Option<&str> {
    match &self.command {
      Some(Commands::Create { project_name }) => Some(project_name.as_str()),
      None => self.project_name.as_deref(),
    }
  }
}

pub fn parse() -> Cli {
  Cli::parse()
}

pub fn run() -> Result<()> {
  let cli = parse();
  let Some(name) = cli.target_name() else {
    Cli::command().print_help()?;
    return Ok(());
  };

  let cwd = std::env::current_dir()?;
  let ctx = AppContext::new(cwd, load_config()?);
  commands::create::run(&ctx, name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn subcommand_and_shorthand_resolve_the_same_name() {
    let explicit = Cli::try_parse_from(["create-sea-js", "create", "demo"]).unwrap();
    let shorthand = Cli::try_parse_from(["create-sea-js", "demo"]).unwrap();
    assert_eq!(explicit.target_name(), Some("demo"));
    assert_eq!(shorthand.target_name(), Some("demo"));
  }

  #[test]
  fn no_arguments_means_no_project() {
    let cli = Cli::try_parse_from(["create-sea-js"]).unwrap();
    assert_eq!(cli.target_name(), None);
  }

  #[test]
  fn create_requires_a_name() {
    assert!(Cli::try_parse_from(["create-sea-js", "create"]).is_err());
  }

  #[test]
  fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
  }
}
