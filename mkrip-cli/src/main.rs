//! mkrip - inspect Matroska files and extract their tracks.

mod extract;
mod list;

use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "mkrip")]
#[command(version)]
#[command(about = "Inspect Matroska files and extract tracks")]
#[command(long_about = "mkrip reads Matroska containers (.mkv, .mka, .mk3d, .mks), \
    prints their element tree, and extracts individual tracks into \
    standalone per-codec files.\n\n\
    EXAMPLES:\n    \
    mkrip list movie.mkv --size --position\n    \
    mkrip extract movie.mkv -o out/ -t 1,3")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the element tree of a Matroska file
    List {
        /// Source Matroska file
        input: PathBuf,

        /// Show the position of each element in decimal
        #[arg(short = 'P', long)]
        position: bool,

        /// Show the size of each element including its header
        #[arg(short = 's', long)]
        size: bool,

        /// Show the data size of each element
        #[arg(short = 'z', long)]
        data_size: bool,
    },
    /// Extract tracks into standalone files
    Extract {
        /// Source Matroska file
        input: PathBuf,

        /// Path to the output folder
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Numbers of the tracks to extract (all tracks when omitted)
        #[arg(short, long, value_delimiter = ',')]
        tracks: Vec<u64>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let result = match args.command {
        Command::List {
            input,
            position,
            size,
            data_size,
        } => list::run(
            &input,
            list::Options {
                // --verbose implies every suffix column.
                show_position: position || args.verbose,
                show_size: size || args.verbose,
                show_data_size: data_size || args.verbose,
            },
        ),
        Command::Extract {
            input,
            output,
            tracks,
        } => extract::run(&input, output.as_deref(), &tracks),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
