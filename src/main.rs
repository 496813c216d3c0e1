//! alang CLI - compiles A source to a native executable via C

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use alang::logger::Logger;
use alang::mode::CompileMode;
use alang::toolchain::{self, BINARY_NAME, OUTPUT_FILE};

/// A to C compiler
#[derive(Parser, Debug)]
#[command(name = "alc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile A source to a native executable", long_about = None)]
struct Cli {
    /// Input A source file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Compile mode
    #[arg(value_name = "MODE", value_enum, default_value_t = CompileMode::Optimized)]
    mode: CompileMode,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let logger = Logger::new(cli.mode.log_mode());
    let start = Instant::now();

    let source = match std::fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: could not open file {}: {err}", cli.input.display());
            std::process::exit(1);
        }
    };

    let output = match alang::compile_with_mode(&source, cli.mode) {
        Ok(output) => output,
        Err(diags) => {
            eprint!("{}", diags.to_text());
            eprintln!("Compilation aborted.");
            std::process::exit(1);
        }
    };
    if !output.diagnostics.is_empty() {
        eprint!("{}", output.diagnostics.to_text());
    }

    std::fs::write(OUTPUT_FILE, &output.code)?;

    if let Err(err) = toolchain::compile_c(cli.mode, &logger) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    println!(
        "Compiled: ./{BINARY_NAME} ({:.3}s)",
        start.elapsed().as_secs_f64()
    );

    if cli.mode.auto_run() {
        toolchain::run_binary(&logger)?;
    }

    Ok(())
}
