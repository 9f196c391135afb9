//! airuler - AI rule template compiler
//!
//! CLI entry point for compiling and inspecting rule templates.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use airuler::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use airuler::config::Config;
use airuler::{Compiler, Target, parse_targets, split_front_matter};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(source_dirs = ?config.source_dirs(), output_dir = ?config.output_dir, "airuler loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Compile { targets } => cmd_compile(&config, &targets),
        Command::Targets => cmd_targets(&config),
        Command::List { format } => cmd_list(&config, format),
        Command::Show { name, format } => cmd_show(&config, &name, format),
    }
}

fn cmd_compile(config: &Config, requested: &[String]) -> Result<()> {
    debug!(?requested, "cmd_compile: called");
    let names = if requested.is_empty() {
        config.default_targets.as_slice()
    } else {
        requested
    };
    let targets = parse_targets(names)?;
    let targets = if targets.is_empty() { Target::ALL.to_vec() } else { targets };

    let compiler = Compiler::from_config(config);
    info!(source_dirs = ?compiler.source_dirs(), ?targets, "Compiling templates");
    let report = compiler.compile(&targets).context("Failed to load templates")?;

    for output in &report.outputs {
        println!(
            "{} {} {} {}",
            "✓".green(),
            format!("[{}]", output.target).cyan(),
            output.path.display(),
            format!("({} bytes)", output.bytes).dimmed()
        );
    }

    if report.is_success() {
        println!(
            "Compiled {} file(s) for {}",
            report.outputs.len(),
            targets.iter().map(Target::name).collect::<Vec<_>>().join(", ")
        );
        return Ok(());
    }

    for failure in &report.failures {
        eprintln!("{} {}", "✗".red(), failure);
    }
    Err(eyre!(
        "{} compilation(s) failed, {} file(s) written",
        report.failures.len(),
        report.outputs.len()
    ))
}

fn cmd_targets(config: &Config) -> Result<()> {
    debug!("cmd_targets: called");
    for target in Target::ALL {
        let dir = config.output_dir.join(target.output_dir());
        println!("{:<8} {}/<name>.{}", target.name().cyan(), dir.display(), target.extension());
    }
    Ok(())
}

fn cmd_list(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_list: called");
    let set = Compiler::from_config(config).load()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "templates": set.templates.keys().collect::<Vec<_>>(),
                "partials": set.partials.keys().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Templates ({})", set.templates.len());
            for (name, source) in &set.templates {
                println!("  {} {}", name.cyan(), source.path.display().to_string().dimmed());
            }
            println!("Partials ({})", set.partials.len());
            for (name, source) in &set.partials {
                println!("  {} {}", name.yellow(), source.path.display().to_string().dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_show(config: &Config, name: &str, format: OutputFormat) -> Result<()> {
    debug!(%name, ?format, "cmd_show: called");
    let set = Compiler::from_config(config).load()?;
    let source = set.get(name).ok_or_else(|| eyre!("Template not found: {}", name))?;
    let (front_matter, _) =
        split_front_matter(&source.content).with_context(|| format!("Failed to parse front matter of {}", name))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&front_matter)?),
        OutputFormat::Text => {
            println!("{} {}", name.cyan(), source.path.display().to_string().dimmed());
            print!("{}", serde_yaml::to_string(&front_matter)?);
        }
    }
    Ok(())
}
