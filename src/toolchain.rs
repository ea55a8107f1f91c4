//! Toolchain executable resolution
//!
//! The compiler that actually runs can be overridden by environment at
//! build time, so it must be resolved here rather than assumed. The
//! resolved C++ compiler is the one the prober probes and the compile
//! step invokes; always the same executable for both.
//!
//! Priority order for each tool:
//! 1. Environment override (`CXX`, `MAKE`)
//! 2. Platform default found in `PATH`
//! 3. `Configuration` error if nothing resolves

use crate::env_vars;
use crate::error::BuildError;
use crate::platform::{OsFamily, PlatformProfile};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolved build toolchain, fixed for one pipeline invocation
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// C++ compiler driving extension compiles and arch probing
    pub cxx: PathBuf,
    /// Make command driving vendor fetch and the shared-library build
    pub make: String,
}

impl Toolchain {
    /// Resolve the toolchain for a platform profile
    ///
    /// Fails with a `Configuration` error before anything is spawned if
    /// no C++ compiler can be found.
    pub fn resolve(profile: &PlatformProfile) -> Result<Self, BuildError> {
        let cxx = resolve_cxx(profile)?;
        let make = env_vars::make_command().unwrap_or_else(|| "make".to_string());
        crate::debug!("resolved toolchain: cxx={} make={make}", cxx.display());
        Ok(Self { cxx, make })
    }
}

/// Resolve the C++ compiler executable
///
/// Checks the `CXX` environment override first, then the conventional
/// driver names for the platform in `PATH`.
pub fn resolve_cxx(profile: &PlatformProfile) -> Result<PathBuf, BuildError> {
    if let Some(cxx) = env_vars::cxx() {
        let path = PathBuf::from(&cxx);
        // Overrides may name a bare program resolved through PATH
        if path.is_absolute() && !path.exists() {
            return Err(BuildError::Configuration(format!(
                "CXX points to {cxx}, which does not exist"
            )));
        }
        return Ok(path);
    }

    let candidates: &[&str] = match profile.os {
        OsFamily::Darwin => &["clang++", "c++"],
        OsFamily::Linux => &["c++", "g++", "clang++"],
        OsFamily::Windows => &["cl"],
    };

    for name in candidates {
        if let Some(path) = find_in_path(name) {
            return Ok(path);
        }
    }

    Err(BuildError::Configuration(format!(
        "no C++ compiler found (tried {}); set CXX to the compiler to use",
        candidates.join(", ")
    )))
}

/// Locate an executable via `which`
fn find_in_path(name: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path_str = String::from_utf8_lossy(&output.stdout);
    let path = PathBuf::from(path_str.trim());
    path.exists().then_some(path)
}

/// Check that every source file a unit names exists
///
/// Missing sources are a configuration error reported before any
/// compiler is spawned.
pub fn check_sources(name: &str, sources: &[PathBuf], root: &Path) -> Result<(), BuildError> {
    for source in sources {
        let path = if source.is_absolute() {
            source.clone()
        } else {
            root.join(source)
        };
        if !path.exists() {
            return Err(BuildError::Configuration(format!(
                "unit {name}: source file {} not found",
                path.display()
            )));
        }
    }
    Ok(())
}
