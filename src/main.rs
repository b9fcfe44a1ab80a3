mod config;
mod data;
mod error;
mod pipeline;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use config::Config;

#[derive(Parser)]
#[command(name = "meterprep")]
#[command(about = "Convert energy-meter export files into Home Assistant import CSVs")]
#[command(version)]
struct Cli {
    /// File name pattern for the export files, glob wildcards allowed
    /// (e.g. 'exports/Eneco_*.xlsx')
    pattern: String,

    /// Provider profile JSON
    #[arg(long, short)]
    config: PathBuf,

    /// Directory the import files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip the overwrite confirmation
    #[arg(long, short)]
    yes: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    // Existing import files in the target directory get overwritten.
    if !cli.yes && !confirm()? {
        return Ok(());
    }

    pipeline::run(&cli.pattern, &config, &cli.out_dir)
}

fn confirm() -> Result<bool> {
    print!("Previously prepared files will be overwritten, continue [y/N]?: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_lowercase().starts_with('y'))
}
