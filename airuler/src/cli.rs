//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::target::Target;

/// airuler - AI rule template compiler
#[derive(Parser)]
#[command(
    name = "airuler",
    about = "Compile AI rule templates into per-target rule files",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile templates for the given targets (default: all)
    Compile {
        /// Targets to compile for (cursor, claude, cline, copilot, roo)
        #[arg(value_name = "TARGET")]
        targets: Vec<String>,
    },

    /// List known targets with their output locations
    Targets,

    /// List loaded templates and partials
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the decoded front matter of a template or partial
    Show {
        /// Logical template name, e.g. `lang/go` or `partials/header`
        name: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for inspection commands
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use 'text' or 'json'", s)),
        }
    }
}

/// Location of the log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airuler")
        .join("logs")
        .join("airuler.log")
}

/// Help footer listing targets and the log location
pub fn generate_after_help() -> String {
    let mut help = String::from("Targets:\n");
    for target in Target::ALL {
        help.push_str(&format!(
            "  {:<8} -> compiled/{}/<name>.{}\n",
            target.name(),
            target.output_dir(),
            target.extension()
        ));
    }
    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compile_targets() {
        let cli = Cli::try_parse_from(["airuler", "compile", "cursor", "claude"]).unwrap();
        match cli.command {
            Command::Compile { targets } => assert_eq!(targets, vec!["cursor", "claude"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["airuler", "list", "--format", "json", "-l", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::List { format: OutputFormat::Json }));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_after_help_lists_targets() {
        let help = generate_after_help();
        for target in Target::ALL {
            assert!(help.contains(target.name()));
        }
        assert!(help.contains("instructions.md"));
    }
}
