//! Artifact placement
//!
//! Computes where a built artifact must be copied and performs the
//! copies. Packaged installs get one destination in the build-output
//! tree; editable (in-place) installs additionally get a copy inside
//! the live source package directory, so imports from the source tree
//! see the freshly built artifact without a separate install step.

use crate::error::BuildError;
use crate::platform::PlatformProfile;
use crate::units::BuildUnit;
use std::fs;
use std::path::{Path, PathBuf};

/// How the surrounding packaging tool is installing the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Build a distributable package; artifacts land in the build tree only
    Packaged,
    /// Editable / in-place development install
    Editable,
}

/// Path roots supplied by the manifest and packaging tool
#[derive(Debug, Clone)]
pub struct PathRoots {
    /// Scratch directory for intermediate outputs
    pub build_temp: PathBuf,
    /// Build-output package tree
    pub build_lib: PathBuf,
    /// Live source package directory
    pub package_dir: PathBuf,
}

impl PathRoots {
    /// Anchor manifest-relative roots at `base`
    #[must_use]
    pub fn anchored(base: &Path, build_temp: &Path, build_lib: &Path, package_dir: &Path) -> Self {
        let anchor = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        Self {
            build_temp: anchor(build_temp),
            build_lib: anchor(build_lib),
            package_dir: anchor(package_dir),
        }
    }
}

/// Destination paths for one unit's artifact, in copy order
#[must_use]
pub fn destinations(
    unit: &BuildUnit,
    mode: InstallMode,
    roots: &PathRoots,
    profile: &PlatformProfile,
) -> Vec<PathBuf> {
    let filename = unit.artifact_filename(profile);
    let mut dests = vec![roots.build_lib.join(&filename)];
    if mode == InstallMode::Editable {
        dests.push(roots.package_dir.join(&filename));
    }
    dests
}

/// Copy a built artifact to every destination, creating directories
///
/// Idempotent: rerunning with an unchanged source reproduces
/// byte-identical files at the same destinations.
pub fn place(artifact: &Path, dests: &[PathBuf]) -> Result<(), BuildError> {
    for dest in dests {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::Placement {
                destination: dest.clone(),
                source: e,
            })?;
        }
        fs::copy(artifact, dest).map_err(|e| BuildError::Placement {
            destination: dest.clone(),
            source: e,
        })?;
        crate::debug!("placed {} -> {}", artifact.display(), dest.display());
    }
    Ok(())
}
