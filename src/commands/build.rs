//! Build command - run the full pipeline
//!
//! Loads the manifest, resolves the platform profile and toolchain,
//! enforces the macOS deployment-target floor, then runs every
//! applicable pipeline step in order.

use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};

use extforge::manifest::Manifest;
use extforge::pipeline::{BuildOptions, Outcome, Pipeline};
use extforge::placement::{InstallMode, PathRoots};
use extforge::runner::SystemRunner;
use extforge::toolchain::Toolchain;
use extforge::{deployment, platform};

/// Run the build command.
#[allow(clippy::fn_params_excessive_bools)]
pub(crate) fn run(
    manifest_path: Option<&str>,
    inplace: bool,
    verbose: bool,
    quiet: bool,
    skip_extensions: bool,
) -> Result<()> {
    let runner = SystemRunner;
    let profile = platform::current_profile();

    // May replace the process image; returns only when no re-exec is needed
    deployment::ensure_target(&runner, &profile);

    let (manifest, source_root) = load_manifest(manifest_path)?;

    let toolchain = if profile.builds_native_units() {
        Some(Toolchain::resolve(&profile)?)
    } else {
        None
    };

    let roots = PathRoots::anchored(
        &source_root,
        &manifest.paths.build_temp,
        &manifest.paths.build_lib,
        &manifest.package_dir(),
    );

    let mode = if inplace {
        InstallMode::Editable
    } else {
        InstallMode::Packaged
    };

    let options = BuildOptions {
        mode,
        verbose,
        skip_extensions: skip_extensions || extforge::env_vars::skip_extensions(),
    };

    let pipeline = Pipeline::new(
        &runner,
        profile,
        toolchain,
        manifest.registry(),
        roots,
        source_root,
        manifest.paths.vendor_target.clone(),
        options,
    )?;

    match pipeline.run() {
        Outcome::Done(report) => {
            if !quiet {
                println!(
                    "Built {} extension module(s) and {} shared library(ies); placed {} artifact(s)",
                    report.compiled_modules.len(),
                    report.built_libraries.len(),
                    report.placed.len(),
                );
                if !report.arch_flags.is_empty() {
                    println!("Architectures: {}", report.arch_flags.archs().join(", "));
                }
            }
            Ok(())
        }
        Outcome::Aborted { step, error } => Err(anyhow!(error).context(format!("step {step} failed"))),
    }
}

/// Load the manifest and determine the source root it anchors
fn load_manifest(manifest_path: Option<&str>) -> Result<(Manifest, PathBuf)> {
    let Some(path) = manifest_path else {
        let root = env::current_dir().context("cannot determine current directory")?;
        let manifest = Manifest::load_from_dir(&root)?;
        return Ok((manifest, root));
    };

    let path = Path::new(path);
    let manifest = Manifest::load(path)?;
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((manifest, root))
}
