//! Selser CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use selser_source_map::OffsetType;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bundle;
mod commands;

#[derive(Parser)]
#[command(name = "selser")]
#[command(version)]
#[command(about = "Citation processing and offset remapping for page bundles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve citations and render reference lists
    Cite {
        /// Page bundle (JSON)
        bundle: PathBuf,

        /// Citation settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the resulting bundle to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Convert every source offset to another numbering
    ConvertOffsets {
        /// Page bundle (JSON)
        bundle: PathBuf,

        /// Units the offsets are counted in (defaults to the bundle's offsetType)
        #[arg(long)]
        from: Option<OffsetType>,

        /// Units to convert to: byte, char or ucs2
        #[arg(long)]
        to: OffsetType,

        /// Write the resulting bundle to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Move every source offset by a fixed amount
    ShiftOffsets {
        /// Page bundle (JSON)
        bundle: PathBuf,

        /// Amount to move by (negative moves towards the start)
        #[arg(long, allow_hyphen_values = true)]
        by: i64,

        /// Write the resulting bundle to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "selser=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cite {
            bundle,
            config,
            output,
        } => commands::cite::execute(commands::cite::CiteArgs {
            bundle,
            config,
            output,
        }),
        Commands::ConvertOffsets {
            bundle,
            from,
            to,
            output,
        } => commands::offsets::convert(commands::offsets::ConvertArgs {
            bundle,
            from,
            to,
            output,
        }),
        Commands::ShiftOffsets { bundle, by, output } => {
            commands::offsets::shift(commands::offsets::ShiftArgs { bundle, by, output })
        }
    }
}
