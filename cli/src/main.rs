use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tfidf_cli::{load, render, Cli};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let (corpus, report) = load(&cli.input)?;
    if !report.skipped.is_empty() {
        eprintln!("skipped {} document(s):", report.skipped.len());
        for s in &report.skipped {
            eprintln!("  {}: {}", s.name, s.reason);
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&corpus, &cli.command, cli.json, &mut out)?;
    out.flush()?;
    Ok(())
}
