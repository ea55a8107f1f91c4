//! Extforge CLI internal library code
//!
//! Orchestrates native-extension builds: compiler capability probing,
//! extension-module compilation, the external-make shared-library
//! build, and artifact placement for packaged and editable installs.

/// Version string reported by `info`, with any `DEV_BUILD` suffix applied
#[must_use]
pub fn reported_version() -> String {
    let base = env!("CARGO_PKG_VERSION");
    env_vars::dev_build().map_or_else(|| base.to_string(), |n| format!("{base}.dev{n}"))
}

pub mod debug;
pub mod deployment;
pub mod env_vars;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod placement;
pub mod platform;
pub mod probe;
pub mod runner;
pub mod toolchain;
pub mod units;

// Re-export common types for convenience
pub use deployment::{TargetDecision, ensure_target};
pub use error::BuildError;
pub use manifest::{MANIFEST_FILENAME, Manifest};
pub use pipeline::{BuildOptions, Outcome, Pipeline, Report, Step};
pub use placement::{InstallMode, PathRoots, destinations, place};
pub use platform::{OsFamily, PlatformProfile, current_profile};
pub use probe::{ArchFlagSet, CANDIDATE_ARCHS, probe};
pub use runner::{Invocation, ProcessRunner, RunOutput, SystemRunner};
pub use toolchain::Toolchain;
pub use units::{BuildUnit, Registry, UnitKind};
