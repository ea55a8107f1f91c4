//! Extforge command-line interface
//!
//! Native-extension build orchestrator: probes compiler architecture
//! support, compiles extension modules, drives the external make for
//! the shared library, and places artifacts for packaged or editable
//! installs.

use clap::{Parser, Subcommand};
use std::process;

mod commands;

/// Display an error with its cause chain and optional backtrace
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Parser)]
#[command(name = "extforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A native-extension build orchestrator", long_about = None)]
pub(crate) struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Show error backtraces (requires RUST_BACKTRACE)
    #[arg(long, global = true)]
    backtrace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full build pipeline
    Build {
        /// Path to the manifest (defaults to ./extforge.toml)
        #[arg(long)]
        manifest: Option<String>,

        /// Editable install: also copy artifacts into the live source tree
        #[arg(long)]
        inplace: bool,

        /// Print each step and every toolchain invocation
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long, short, conflicts_with = "verbose")]
        quiet: bool,

        /// Skip extension-module compiles
        #[arg(long)]
        skip_extensions: bool,
    },

    /// Probe which architectures the C++ compiler supports
    Probe {
        /// Compiler to probe (defaults to the resolved C++ compiler)
        #[arg(long)]
        compiler: Option<String>,
    },

    /// Print the resolved platform profile, toolchain, and manifest units
    Info {
        /// Path to the manifest (defaults to ./extforge.toml)
        #[arg(long)]
        manifest: Option<String>,
    },

    /// Write a starter extforge.toml
    Init {
        /// Project name (defaults to the current directory name)
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    extforge::debug::init_debug(cli.debug);

    let result = match cli.command {
        Commands::Build {
            manifest,
            inplace,
            verbose,
            quiet,
            skip_extensions,
        } => commands::build::run(manifest.as_deref(), inplace, verbose, quiet, skip_extensions),
        Commands::Probe { compiler } => commands::probe::run(compiler.as_deref()),
        Commands::Info { manifest } => commands::info::run(manifest.as_deref()),
        Commands::Init { name } => commands::init::run(name.as_deref()),
    };

    if let Err(err) = result {
        display_error(&err, cli.backtrace);
        process::exit(1);
    }
}
