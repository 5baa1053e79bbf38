use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mdlatex::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdlatex")]
#[command(about = "Convert Markdown to LaTeX")]
struct Cli {
    /// Input Markdown file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// TOML config file overriding the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output LaTeX file (writes stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the document, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::compiled_default(),
    };

    let markdown = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    debug!(bytes = markdown.len(), "read markdown");

    let latex = mdlatex::markdown_to_latex_with_config(&markdown, &config)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, latex).with_context(|| format!("writing {}", path.display()))?
        }
        None => {
            let mut stdout = io::stdout().lock();
            if latex.ends_with('\n') {
                write!(stdout, "{latex}").context("writing stdout")?;
            } else {
                writeln!(stdout, "{latex}").context("writing stdout")?;
            }
            stdout.flush().context("writing stdout")?;
        }
    }

    Ok(())
}
