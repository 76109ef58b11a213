//! Confetti CLI - headless rendering and a live trigger listener

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{listen, presets, render, simulate, trigger, EffectArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "confetti")]
#[command(about = "Confetti particle overlay engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an effect to a PNG frame sequence (headless)
    Render {
        #[command(flatten)]
        effect: EffectArgs,

        /// Output directory for frame_NNNNN.png files
        #[arg(short, long, default_value = "frames")]
        output: String,

        /// Write every Nth frame
        #[arg(long, default_value = "1")]
        every: u64,
    },

    /// Run an effect headless and print per-frame statistics
    Simulate {
        #[command(flatten)]
        effect: EffectArgs,

        /// Print every Nth frame
        #[arg(long, default_value = "10")]
        every: u64,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// List built-in presets
    Presets {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Show which effect a message would fire
    Trigger {
        /// Message text, or a JSON object with a "text" field
        message: String,

        /// Path to overlay config
        #[arg(short, long, default_value = "confetti.toml")]
        config: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Read messages from stdin and fire matching effects at 60 Hz
    Listen {
        /// Path to overlay config
        #[arg(short, long, default_value = "confetti.toml")]
        config: String,

        /// Reload the config when it changes
        #[arg(long)]
        watch: bool,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            effect,
            output,
            every,
        } => render::run(render::RenderArgs {
            effect,
            output,
            every,
        }),
        Commands::Simulate {
            effect,
            every,
            format,
        } => simulate::run(simulate::SimulateArgs {
            effect,
            every,
            format,
        }),
        Commands::Presets { format } => presets::run(&format),
        Commands::Trigger {
            message,
            config,
            format,
        } => trigger::run(&message, &config, &format),
        Commands::Listen { config, watch } => listen::run(listen::ListenArgs { config, watch }),
    }
}
