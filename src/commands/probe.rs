//! Probe command - report compiler architecture support
//!
//! Diagnostic counterpart of the pipeline's arch-probe step: runs the
//! same trivial-compile probe and prints what it found.

use anyhow::Result;
use std::path::PathBuf;

use extforge::probe::CANDIDATE_ARCHS;
use extforge::runner::SystemRunner;
use extforge::{platform, probe, toolchain};

/// Run the probe command.
pub(crate) fn run(compiler: Option<&str>) -> Result<()> {
    let profile = platform::current_profile();

    if !profile.supports_multiarch {
        println!(
            "{} does not support multi-architecture binaries; nothing to probe",
            profile.os
        );
        return Ok(());
    }

    let compiler = match compiler {
        Some(path) => PathBuf::from(path),
        None => toolchain::resolve_cxx(&profile)?,
    };

    println!("Compiler: {}", compiler.display());
    let flags = probe::probe(&SystemRunner, &compiler, CANDIDATE_ARCHS)?;

    if flags.is_empty() {
        println!("No candidate architectures accepted");
    } else {
        println!("Discovered arch flags: {flags}");
    }
    Ok(())
}
