mod deframe;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdu_utils::deframer::{BitFormat, OutputPolicy, RecoveryPolicy, SyncPattern};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find frames in a bit stream file using an access code.
    ///
    /// Each frame found is written to stdout as a single line along with its
    /// bit_reversed, pdu_num, and bit_index metadata.
    Deframe {
        /// JSON file containing deframer options. Options given on the command line
        /// override those in the file.
        #[arg(short, long, value_name = "path")]
        config: Option<PathBuf>,

        /// Access code, or syncword, in binary (0b prefix optional) or hex (0x prefix).
        #[arg(short, long)]
        access_code: Option<String>,

        /// Optional tail sync expected directly after the access code.
        #[arg(short = 'T', long)]
        tail_sync: Option<String>,

        /// Total frame length in bits, including the syncword(s).
        #[arg(short, long)]
        burst_len: Option<usize>,

        /// Maximum number of syncword bit errors.
        #[arg(short, long)]
        threshold: Option<usize>,

        /// What to do with the syncword(s) in the output; discard, fix, or keep.
        #[arg(short, long)]
        output: Option<OutputPolicy>,

        /// How to resume searching after each frame; strict, reset, or permissive.
        #[arg(short, long)]
        recovery: Option<RecoveryPolicy>,

        /// How bits are stored in the input file; unpacked (one bit per byte) or packed.
        #[arg(short, long, default_value = "unpacked")]
        input_format: BitFormat,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: deframe::Format,

        /// Input bit stream file
        input: PathBuf,
    },
    /// Show the bits a syncword string parses to.
    Pattern {
        /// Syncword in binary (0b prefix optional) or hex (0x prefix).
        pattern: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("PDU_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Deframe {
            config,
            access_code,
            tail_sync,
            burst_len,
            threshold,
            output,
            recovery,
            input_format,
            format,
            input,
        } => {
            let opts = deframe::Overrides {
                access_code,
                tail_sync,
                burst_len,
                threshold,
                output,
                recovery,
            };
            let config = deframe::load_config(config.as_deref(), opts)?;
            deframe::deframe(&input, &config, input_format, &format)
        }
        Commands::Pattern { pattern } => {
            let pat: SyncPattern = pattern
                .parse()
                .with_context(|| format!("invalid pattern {pattern:?}"))?;
            println!("{pat} ({} bits)", pat.len());
            Ok(())
        }
    }
}
