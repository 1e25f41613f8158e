//! ktwrap
//!
//! Generates Kotlin builders, coroutine wrappers and a multipart client
//! from the Java sources of a Telegram bot API library.

use std::path::PathBuf;

use clap::Parser;
use ktwrap_lib::{Config, Generator, KtWrapError};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Kotlin wrapper generator for Java API sources
#[derive(Parser, Debug)]
#[command(name = "ktwrap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the generator configuration
    #[arg(default_value = "ktwrap.toml")]
    config: PathBuf,

    /// Output directory, overriding `output_dir` from the configuration
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Generate only the file with this name (e.g. "Objects")
    #[arg(long, value_name = "FILE")]
    only: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over -v flags
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,ktwrap_lib=info".to_string(),
            2 => "info,ktwrap_lib=debug".to_string(),
            _ => "debug,ktwrap_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<(), KtWrapError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(&cli.config)?;
    if let Some(output) = cli.output {
        config.output_dir = output;
    }

    let report = Generator::new()
        .dry_run(cli.dry_run)
        .only(cli.only)
        .run(&config)?;

    if !report.dry_run {
        for file in &report.files {
            println!("{:<28} {:>5}  {}", file.target, file.declarations, file.path.display());
        }
        println!(
            "Generated {} declarations in {} files",
            report.total_declarations(),
            report.files.len()
        );
    }

    Ok(())
}
