//! Platform profile resolution
//!
//! The host OS is inspected exactly once and condensed into a
//! [`PlatformProfile`]: shared-library suffix, whether an external `make`
//! drives the library build, whether multi-architecture (fat binary)
//! probing applies, and the default language-standard flag. Every
//! downstream component reads fields from the profile instead of
//! re-testing the platform identifier, so the pipeline steps cannot
//! drift apart on platform behavior.

use std::env;
use std::fmt;
use std::sync::LazyLock;

/// Cached profile (resolved once, reused throughout execution)
static CURRENT_PROFILE: LazyLock<PlatformProfile> = LazyLock::new(detect_profile_impl);

/// Operating-system family, as far as this orchestrator cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    /// Linux and other ELF unixes
    Linux,
    /// macOS
    Darwin,
    /// Windows (no native builds; pure-source packaging only)
    Windows,
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        };
        write!(f, "{name}")
    }
}

/// Platform facts the build pipeline branches on, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    /// OS family the profile was derived from
    pub os: OsFamily,
    /// Shared-library filename suffix (".dll" / ".dylib" / ".so")
    pub shared_lib_suffix: &'static str,
    /// Extension-module filename suffix (modules stay ".so" on macOS)
    pub module_suffix: &'static str,
    /// Whether the external make drives vendor fetch and the library build
    pub uses_external_make: bool,
    /// Whether fat-binary arch probing applies (macOS only)
    pub supports_multiarch: bool,
    /// Default language-standard flag for extension compiles
    pub std_flag: &'static str,
}

impl PlatformProfile {
    /// Profile for a given OS family
    #[must_use]
    pub const fn for_os(os: OsFamily) -> Self {
        match os {
            OsFamily::Linux => Self {
                os,
                shared_lib_suffix: ".so",
                module_suffix: ".so",
                uses_external_make: true,
                supports_multiarch: false,
                std_flag: "-std=c++14",
            },
            OsFamily::Darwin => Self {
                os,
                shared_lib_suffix: ".dylib",
                module_suffix: ".so",
                uses_external_make: true,
                supports_multiarch: true,
                std_flag: "-std=c++14",
            },
            // No DLL build on Windows currently; extensions are disabled
            // wholesale and only pure-source packaging proceeds.
            OsFamily::Windows => Self {
                os,
                shared_lib_suffix: ".dll",
                module_suffix: ".dll",
                uses_external_make: false,
                supports_multiarch: false,
                std_flag: "/std:c++14",
            },
        }
    }

    /// Whether any native build unit can be built on this platform
    #[must_use]
    pub const fn builds_native_units(&self) -> bool {
        self.uses_external_make
    }

    /// Shared-library artifact name for a unit (`lib<name><suffix>`)
    ///
    /// Depends solely on the profile, independent of extension-module
    /// filename conventions (which may embed ABI tags).
    #[must_use]
    pub fn shared_lib_filename(&self, name: &str) -> String {
        format!("lib{name}{}", self.shared_lib_suffix)
    }
}

/// Resolve the profile for the current host
///
/// The platform identifier is read once on first call; all subsequent
/// calls return the cached value. No runtime platform switching.
#[must_use]
pub fn current_profile() -> PlatformProfile {
    *CURRENT_PROFILE
}

fn detect_profile_impl() -> PlatformProfile {
    PlatformProfile::for_os(match env::consts::OS {
        "macos" => OsFamily::Darwin,
        "windows" => OsFamily::Windows,
        _ => OsFamily::Linux,
    })
}
