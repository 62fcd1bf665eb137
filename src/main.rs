//! C0 front-end driver

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use c0_frontend::feedback::{CompilationFeedback, CompilationStats};
use c0_frontend::frontend::lexer::Lexer;
use c0_frontend::Error;

/// C0 compiler front-end
#[derive(Parser, Debug)]
#[command(name = "c0c")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "C0 compiler front-end - checks C0 programs and reports the first error")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,

        /// Output format of the report
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Print the analysed program as JSON
        #[arg(long)]
        emit_symbols: bool,
    },
    /// Dump the token stream of a source file
    Tokens {
        /// Input source file
        input: PathBuf,
    },
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Check {
            input,
            format,
            emit_symbols,
        } => check_file(input, *format, *emit_symbols),
        Commands::Tokens { input } => dump_tokens(input),
        Commands::Version => {
            println!("c0c 0.1.0");
            println!("C0 Compiler Front-end");
            println!("License: Apache-2.0");
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn read_source(input: &Path) -> c0_frontend::Result<String> {
    fs::read_to_string(input).map_err(|e| Error::Io(format!("{}: {}", input.display(), e)))
}

/// Check a source file; `Ok(false)` when it has errors
fn check_file(input: &Path, format: Format, emit_symbols: bool) -> Result<bool> {
    let file_name = input.display().to_string();
    info!("checking {}", file_name);

    let (feedback, program) = match read_source(input) {
        Ok(source) => CompilationFeedback::check(&source, &file_name),
        Err(err) => (
            CompilationFeedback::from_error(&err, &file_name, CompilationStats::default()),
            None,
        ),
    };

    match format {
        Format::Json => println!("{}", feedback.to_json()),
        Format::Text => print_text(&feedback),
    }

    if let (true, Some(program)) = (emit_symbols, &program) {
        let json = serde_json::to_string_pretty(program).context("serializing program")?;
        println!("{}", json);
    }

    Ok(feedback.success)
}

fn print_text(feedback: &CompilationFeedback) {
    if feedback.success {
        println!(
            "✅ {}: no errors ({} functions, {} globals)",
            feedback.source_file, feedback.stats.function_count, feedback.stats.global_count
        );
        return;
    }

    for report in &feedback.diagnostics {
        match &report.location {
            Some(loc) => eprintln!(
                "{}:{}:{}: error[{}]: {}",
                loc.file, loc.line, loc.column, report.code, report.message
            ),
            None => eprintln!("error[{}]: {}", report.code, report.message),
        }
        if let Some(hint) = report.suggestions.first() {
            eprintln!("  help: {}", hint.message);
        }
    }
}

/// Print one token per line
fn dump_tokens(input: &Path) -> Result<bool> {
    let source = read_source(input)?;
    let tokens = Lexer::new(&source)
        .tokenize()
        .with_context(|| format!("lexing {}", input.display()))?;

    for token in &tokens {
        println!(
            "{}:{}\t{:?}\t{}",
            token.position.line, token.position.column, token.kind, token.text
        );
    }
    Ok(true)
}
