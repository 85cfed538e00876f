use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use wirepack::{Format, OutputOptions, RenderPlan};

/// Render a bundler plan into a module-format wrapped output file
#[derive(Parser, Debug)]
#[command(name = "wirepack", version, about)]
struct Cli {
    /// Render plan (TOML)
    plan: PathBuf,

    /// Output options file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format, overrides the config file
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Global or registered name of the bundle
    #[arg(short, long)]
    name: Option<String>,

    /// Drop optional whitespace
    #[arg(long)]
    compact: bool,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn output_options(&self) -> Result<OutputOptions> {
        let mut options = match &self.config {
            Some(path) => OutputOptions::load(path)?,
            None => OutputOptions::default(),
        };
        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(name) = &self.name {
            options.name = Some(name.clone());
        }
        if self.compact {
            options.compact = true;
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let options = cli.output_options()?;
    debug!("Output options: {options:?}");
    let plan = RenderPlan::load(&cli.plan)?;
    let rendered = plan.render(&options)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} output to {}", options.format, path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
