//! Manifest file handling
//!
//! Reads `extforge.toml`, the static description of a project's native
//! build units and path roots. The manifest is loaded once at process
//! start; nothing mutates it afterwards.

use crate::error::BuildError;
use crate::units::{BuildUnit, Registry};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest filename
pub const MANIFEST_FILENAME: &str = "extforge.toml";

/// Default target name handed to make for the vendor-dependency fetch
pub const DEFAULT_VENDOR_TARGET: &str = "vendor-deps";

/// Project manifest loaded from `extforge.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// `[project]` table
    pub project: Project,
    /// `[paths]` table
    #[serde(default)]
    pub paths: Paths,
    /// `[[unit]]` tables
    #[serde(default, rename = "unit")]
    pub units: Vec<BuildUnit>,
}

/// `[project]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Project name; also the default live package directory name
    pub name: String,
}

/// `[paths]` table, all paths relative to the manifest's directory
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Paths {
    /// Scratch directory for intermediate build outputs
    #[serde(default = "default_build_temp")]
    pub build_temp: PathBuf,
    /// Build-output package tree (what gets packaged)
    #[serde(default = "default_build_lib")]
    pub build_lib: PathBuf,
    /// Live source package directory (editable installs copy here)
    pub package_dir: Option<PathBuf>,
    /// Make target that fetches vendored third-party sources
    #[serde(default = "default_vendor_target")]
    pub vendor_target: String,
}

fn default_build_temp() -> PathBuf {
    PathBuf::from("build/temp")
}

fn default_build_lib() -> PathBuf {
    PathBuf::from("build/lib")
}

fn default_vendor_target() -> String {
    DEFAULT_VENDOR_TARGET.to_string()
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            build_temp: default_build_temp(),
            build_lib: default_build_lib(),
            package_dir: None,
            vendor_target: default_vendor_target(),
        }
    }
}

impl Manifest {
    /// Parse a manifest from TOML text
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        toml::from_str(text)
            .map_err(|e| BuildError::Configuration(format!("invalid manifest: {e}")))
    }

    /// Load the manifest file at `path`
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let text = fs::read_to_string(path).map_err(|e| {
            BuildError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Find and load the manifest for `dir` (the default filename)
    pub fn load_from_dir(dir: &Path) -> Result<Self, BuildError> {
        let path = dir.join(MANIFEST_FILENAME);
        if !path.exists() {
            return Err(BuildError::Configuration(format!(
                "no {MANIFEST_FILENAME} found in {}; run `extforge init` to create one",
                dir.display()
            )));
        }
        Self::load(&path)
    }

    /// Live source package directory (defaults to `src/<project name>`)
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.paths
            .package_dir
            .clone()
            .unwrap_or_else(|| Path::new("src").join(&self.project.name))
    }

    /// Build the unit registry declared by this manifest
    #[must_use]
    pub fn registry(&self) -> Registry {
        Registry::new(self.units.clone())
    }
}

/// Starter manifest written by `extforge init`
#[must_use]
pub fn starter_manifest(project_name: &str) -> String {
    format!(
        r#"[project]
name = "{project_name}"

[paths]
build_temp = "build/temp"
build_lib = "build/lib"
package_dir = "src/{project_name}"
vendor_target = "vendor-deps"

[[unit]]
name = "{project_name}_fast"
kind = "extension-module"
sources = ["native/{project_name}_fast.cpp"]
include_dirs = [".", "native/include"]
binary_compat = true

[[unit]]
name = "{project_name}"
kind = "shared-library"
"#
    )
}
