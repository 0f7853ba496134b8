use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use heapmedian::{append_streaming_medians, write_word_frequencies, EngineConfig};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Running median and word frequencies over lines of text", long_about = None)]
struct Args {
    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append the running median of unique words per line to OUTPUT
    Median {
        input: PathBuf,
        output: PathBuf,

        /// Collapse the heaps every N lines to bound memory (medians become approximate)
        #[arg(short, long)]
        batch_size: Option<u64>,
    },

    /// Write a sorted word frequency table to OUTPUT
    Words {
        input: PathBuf,
        output: PathBuf,

        /// Width of the word column
        #[arg(short, long, default_value_t = heapmedian::DEFAULT_COLUMN_WIDTH)]
        column_width: usize,
    },
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logger(verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_from_verbosity(verbosity));

    // RUST_LOG still wins when set
    builder.parse_default_env();
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    match args.command {
        Command::Median {
            input,
            output,
            batch_size,
        } => {
            let config = match batch_size {
                Some(batch_size) => EngineConfig::new()
                    .with_batch_size(batch_size)
                    .context("Bad --batch-size")?,
                None => EngineConfig::new(),
            };

            let lines = append_streaming_medians(&input, &output, config).with_context(|| {
                format!(
                    "Failed to stream medians from {} to {}",
                    input.display(),
                    output.display()
                )
            })?;

            println!("Appended {lines} medians to {}", output.display());
        }
        Command::Words {
            input,
            output,
            column_width,
        } => {
            let words = write_word_frequencies(&input, &output, column_width).with_context(|| {
                format!(
                    "Failed to write word frequencies from {} to {}",
                    input.display(),
                    output.display()
                )
            })?;

            println!("Wrote {words} distinct words to {}", output.display());
        }
    }

    Ok(())
}
