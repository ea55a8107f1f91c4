//! Build unit descriptors
//!
//! A build unit is one compiled component of the project: either a
//! language-extension module or a shared library produced by the
//! external make. The set of units is fixed at process start from the
//! manifest and never changes mid-build.

use crate::platform::PlatformProfile;
use serde::Deserialize;
use std::path::PathBuf;

/// Kind of native build unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    /// Extension module compiled directly by this orchestrator
    ExtensionModule,
    /// Shared library produced through the external make
    SharedLibrary,
}

impl UnitKind {
    /// Human-readable description
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::ExtensionModule => "extension module",
            Self::SharedLibrary => "shared library",
        }
    }
}

/// One native build unit, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildUnit {
    /// Unit name; shared libraries become `lib<name><suffix>`
    pub name: String,
    /// Kind of unit
    pub kind: UnitKind,
    /// Include directories, in order
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    /// Source files, in order
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Static compile flags, in order
    #[serde(default)]
    pub compile_flags: Vec<String>,
    /// Static link flags, in order
    #[serde(default)]
    pub link_flags: Vec<String>,
    /// Whether the unit restricts itself to the stable binary interface
    #[serde(default)]
    pub binary_compat: bool,
}

impl BuildUnit {
    /// Artifact filename for this unit on the given platform
    ///
    /// Shared libraries follow the `lib<name><suffix>` convention from
    /// the platform profile; extension modules keep the module
    /// convention (plain `<name>` + platform module suffix, no `lib`
    /// prefix, no ABI tag handling here).
    #[must_use]
    pub fn artifact_filename(&self, profile: &PlatformProfile) -> String {
        match self.kind {
            UnitKind::SharedLibrary => profile.shared_lib_filename(&self.name),
            UnitKind::ExtensionModule => format!("{}{}", self.name, profile.module_suffix),
        }
    }
}

/// Read-only registry of the build units for one invocation
#[derive(Debug, Clone, Default)]
pub struct Registry {
    units: Vec<BuildUnit>,
}

impl Registry {
    /// Build a registry from manifest-declared units
    #[must_use]
    pub fn new(units: Vec<BuildUnit>) -> Self {
        Self { units }
    }

    /// All units, in declaration order
    #[must_use]
    pub fn units(&self) -> &[BuildUnit] {
        &self.units
    }

    /// Whether a unit is built on the given platform
    ///
    /// One platform (Windows) disables every native unit; there is no
    /// per-unit platform filtering beyond that.
    #[must_use]
    pub fn is_enabled(&self, _unit: &BuildUnit, profile: &PlatformProfile) -> bool {
        profile.builds_native_units()
    }

    /// Enabled units of a given kind, in declaration order
    pub fn enabled_of_kind<'a>(
        &'a self,
        kind: UnitKind,
        profile: &'a PlatformProfile,
    ) -> impl Iterator<Item = &'a BuildUnit> {
        self.units
            .iter()
            .filter(move |unit| unit.kind == kind && self.is_enabled(unit, profile))
    }
}
