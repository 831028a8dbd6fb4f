mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kirinuki_parse::{Elements, KeywordDictionary, TokenCategory, TokenStream, Tokenizer};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Show how release filenames split into tokens.
#[derive(Debug, Parser)]
#[command(name = "kirinuki", version)]
struct Cli {
    /// Options file (TOML). Defaults to the user config file when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one JSON object per filename.
    #[arg(long)]
    json: bool,

    /// Trace every tokenizer pass on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Filenames to tokenize. Read one per line from stdin when omitted.
    filenames: Vec<String>,
}

#[derive(Serialize)]
struct Report<'r> {
    filename: &'r str,
    tokens: &'r TokenStream,
    elements: &'r Elements,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "kirinuki=debug,kirinuki_parse=trace"
    } else {
        "kirinuki=warn,kirinuki_parse=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let options = config::load(cli.config.as_deref())?;
    let dictionary = KeywordDictionary::new();
    let mut tokenizer = Tokenizer::new(&dictionary, &options);
    let mut out = io::stdout().lock();

    if cli.filenames.is_empty() {
        for line in io::stdin().lock().lines() {
            process(&mut tokenizer, &line?, cli.json, &mut out)?;
        }
    } else {
        for filename in &cli.filenames {
            process(&mut tokenizer, filename, cli.json, &mut out)?;
        }
    }
    Ok(())
}

fn process(
    tokenizer: &mut Tokenizer<'_>,
    filename: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut elements = Elements::new();
    let mut tokens = TokenStream::new();
    if !tokenizer.tokenize(filename, &mut elements, &mut tokens) {
        tracing::warn!(filename, "No tokens produced");
    }

    if json {
        let report = Report {
            filename,
            tokens: &tokens,
            elements: &elements,
        };
        serde_json::to_writer(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        render(filename, &tokens, &elements, out)?;
    }
    Ok(())
}

fn render(
    filename: &str,
    tokens: &TokenStream,
    elements: &Elements,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "{filename}")?;
    if tokens.is_empty() {
        writeln!(out, "  (no tokens)")?;
    }
    for token in tokens {
        let marker = if token.enclosed { "enclosed" } else { "" };
        writeln!(
            out,
            "  {:<10} {:<8} {:?}",
            category_label(token.category),
            marker,
            token.content
        )?;
    }
    for element in elements {
        writeln!(out, "  = {:?}: {}", element.category, element.value)?;
    }
    Ok(())
}

fn category_label(category: TokenCategory) -> &'static str {
    match category {
        TokenCategory::Bracket => "bracket",
        TokenCategory::Delimiter => "delimiter",
        TokenCategory::Identifier => "identifier",
        TokenCategory::Unknown => "unknown",
        TokenCategory::Invalid => "invalid",
    }
}
