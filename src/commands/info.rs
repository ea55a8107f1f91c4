//! Info command - show the resolved build environment
//!
//! Prints the platform profile, toolchain, deployment-target decision,
//! and the manifest's build units, so a developer can see exactly what
//! a build would do before running one.

use anyhow::Result;
use std::env;

use extforge::manifest::Manifest;
use extforge::runner::SystemRunner;
use extforge::toolchain::Toolchain;
use extforge::{deployment, platform};

/// Run the info command.
pub(crate) fn run(manifest_path: Option<&str>) -> Result<()> {
    let profile = platform::current_profile();

    println!("extforge {}", extforge::reported_version());
    println!();
    println!("Platform");
    println!("  os:                 {}", profile.os);
    println!("  shared lib suffix:  {}", profile.shared_lib_suffix);
    println!("  module suffix:      {}", profile.module_suffix);
    println!("  external make:      {}", profile.uses_external_make);
    println!("  multiarch probing:  {}", profile.supports_multiarch);
    println!("  std flag:           {}", profile.std_flag);

    println!();
    println!("Toolchain");
    match Toolchain::resolve(&profile) {
        Ok(toolchain) => {
            println!("  cxx:  {}", toolchain.cxx.display());
            println!("  make: {}", toolchain.make);
        }
        Err(e) => println!("  unresolved: {e}"),
    }
    if let Some(flags) = extforge::env_vars::cxxflags() {
        println!("  CXXFLAGS: {flags}");
    }
    if let Some(flags) = extforge::env_vars::ldflags() {
        println!("  LDFLAGS: {flags}");
    }
    if profile.os == platform::OsFamily::Darwin
        && let deployment::TargetDecision::Satisfied(target) = deployment::decide(
            &profile,
            deployment::resolve_target(&SystemRunner).as_deref(),
            false,
        )
    {
        println!("  deployment target: {target}");
    }

    println!();
    println!("Units");
    let manifest = manifest_path.map_or_else(
        || {
            env::current_dir()
                .map_err(|e| extforge::BuildError::Configuration(e.to_string()))
                .and_then(|dir| Manifest::load_from_dir(&dir))
        },
        |path| Manifest::load(std::path::Path::new(path)),
    );
    match manifest {
        Ok(manifest) => {
            let registry = manifest.registry();
            if registry.units().is_empty() {
                println!("  (none declared)");
            }
            for unit in registry.units() {
                let enabled = if registry.is_enabled(unit, &profile) {
                    "enabled"
                } else {
                    "disabled on this platform"
                };
                println!(
                    "  {} ({}, {}{})",
                    unit.name,
                    unit.kind.description(),
                    enabled,
                    if unit.binary_compat { ", stable ABI" } else { "" },
                );
            }
        }
        Err(e) => println!("  {e}"),
    }

    Ok(())
}
