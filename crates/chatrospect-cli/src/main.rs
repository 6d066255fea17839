//! chatrospect CLI - metrics for two-person chat logs

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chatrospect_core::annotation::{PrecomputedAnnotations, from_llm_json};
use chatrospect_core::normalize::normalize;
use chatrospect_core::{
    AnalysisConfig, AnnotationProvider, Config, InputFormat, NoAnnotations, analyze_with,
};
use clap::{Parser, Subcommand};

mod pretty;

#[derive(Debug, Parser)]
#[command(
    name = "chatrospect",
    author,
    version,
    about = "Deterministic analytics for two-person chat logs",
    propagate_version = true
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true, env = "CHATROSPECT_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a chat log and print the report
    Analyze {
        /// Chat log file, or `-` for stdin
        input: PathBuf,

        /// Input format
        #[arg(long, value_enum, default_value = "auto")]
        format: FormatArg,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        output: OutputArg,

        /// Ranked words per participant
        #[arg(long)]
        top_words: Option<usize>,

        /// Ranked emojis per participant
        #[arg(long)]
        top_emojis: Option<usize>,

        /// Ghosting threshold in hours
        #[arg(long)]
        ghosting_hours: Option<u32>,

        /// Model-produced annotation JSON to attach to the report
        #[arg(long)]
        annotations: Option<PathBuf>,
    },

    /// Normalize a chat log and print the messages as JSON
    Parse {
        /// Chat log file, or `-` for stdin
        input: PathBuf,

        /// Input format
        #[arg(long, value_enum, default_value = "auto")]
        format: FormatArg,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file if none exists
    Init,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FormatArg {
    Auto,
    Json,
    Text,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Auto => InputFormat::Auto,
            FormatArg::Json => InputFormat::Json,
            FormatArg::Text => InputFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputArg {
    Json,
    Pretty,
}

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Default)]
struct AnalysisOverrides {
    top_words: Option<usize>,
    top_emojis: Option<usize>,
    ghosting_hours: Option<u32>,
}

impl AnalysisOverrides {
    fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(n) = self.top_words {
            config.top_words = n;
        }
        if let Some(n) = self.top_emojis {
            config.top_emojis = n;
        }
        if let Some(hours) = self.ghosting_hours {
            config.ghosting_threshold_hours = hours;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_config_path);

    match cli.command {
        Command::Analyze {
            input,
            format,
            output,
            top_words,
            top_emojis,
            ghosting_hours,
            annotations,
        } => {
            let config = Config::load_from_path(&config_path)?;
            let overrides = AnalysisOverrides {
                top_words,
                top_emojis,
                ghosting_hours,
            };
            cmd_analyze(
                &config,
                &input,
                format.into(),
                output,
                &overrides,
                annotations.as_deref(),
            )
        }
        Command::Parse { input, format } => {
            let config = Config::load_from_path(&config_path)?;
            cmd_parse(&config, &input, format.into())
        }
        Command::Config { command } => cmd_config(&config_path, command),
    }
}

fn cmd_analyze(
    config: &Config,
    input: &Path,
    format: InputFormat,
    output: OutputArg,
    overrides: &AnalysisOverrides,
    annotations: Option<&Path>,
) -> Result<()> {
    let analysis = overrides.apply(config.analysis.clone());
    let raw = read_input(input)?;
    let messages = normalize(&raw, format, &analysis.normalizer)?;
    if messages.is_empty() {
        tracing::warn!("no messages found in input");
    }

    let provider: Box<dyn AnnotationProvider> = match annotations {
        Some(path) => Box::new(load_annotations(path)?),
        None => Box::new(NoAnnotations),
    };
    let report = analyze_with(&messages, &analysis, &raw, provider.as_ref())?;

    match output {
        OutputArg::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputArg::Pretty => pretty::print_report(&report),
    }
    Ok(())
}

fn cmd_parse(config: &Config, input: &Path, format: InputFormat) -> Result<()> {
    let raw = read_input(input)?;
    let messages = normalize(&raw, format, &config.analysis.normalizer)?;
    println!("{}", serde_json::to_string_pretty(&messages)?);
    Ok(())
}

fn cmd_config(config_path: &Path, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = Config::load_from_path(config_path)?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommand::Path => println!("{}", config_path.display()),
        ConfigCommand::Init => {
            let existed = config_path.exists();
            Config::ensure_at(config_path)?;
            if existed {
                println!("Config already exists at {}", config_path.display());
            } else {
                println!("Wrote default config to {}", config_path.display());
            }
        }
    }
    Ok(())
}

fn load_annotations(path: &Path) -> Result<PrecomputedAnnotations> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotations from {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Annotations in {} are not valid JSON", path.display()))?;
    Ok(PrecomputedAnnotations(from_llm_json(value)?))
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read chat log from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chat log from {}", path.display()))
}
