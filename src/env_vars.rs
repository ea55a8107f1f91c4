//! Toolchain environment variable handling.
//!
//! All environment lookups the orchestrator performs go through this
//! module so the override surface stays in one place: compiler and make
//! overrides, flag baselines, and extforge's own toggles.

use std::env;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| {
        let s = s.to_lowercase();
        s == "1" || s == "true" || s == "yes"
    })
}

// Toolchain overrides - respected everywhere an executable is resolved

/// Get the C++ compiler override (`CXX`).
pub fn cxx() -> Option<String> {
    env::var("CXX").ok().filter(|s| !s.is_empty())
}

/// Get the make command override (`MAKE`).
pub fn make_command() -> Option<String> {
    env::var("MAKE").ok().filter(|s| !s.is_empty())
}

// Flag baselines - set by outer build tooling and appended to every
// extension-module compile

/// Get extra C++ compile flags (`CXXFLAGS`).
pub fn cxxflags() -> Option<String> {
    env::var("CXXFLAGS").ok().filter(|s| !s.is_empty())
}

/// Get extra link flags (`LDFLAGS`).
pub fn ldflags() -> Option<String> {
    env::var("LDFLAGS").ok().filter(|s| !s.is_empty())
}

// Deployment target handling (macOS only)

/// Get the macOS deployment target (`MACOSX_DEPLOYMENT_TARGET`).
pub fn deployment_target() -> Option<String> {
    env::var("MACOSX_DEPLOYMENT_TARGET")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Check if this process was already re-executed once to force a newer
/// deployment target (`EXTFORGE_RELAUNCHED`). Guards against a re-exec
/// loop when an external mechanism keeps reasserting an old value.
pub fn relaunched() -> bool {
    is_enabled("EXTFORGE_RELAUNCHED")
}

// Extforge's own toggles

/// Check if debug logging is enabled (`EXTFORGE_DEBUG`).
pub fn debug_enabled() -> bool {
    is_enabled("EXTFORGE_DEBUG")
}

/// Check if extension building is disabled (`EXTFORGE_SKIP_EXTENSIONS`).
pub fn skip_extensions() -> bool {
    is_enabled("EXTFORGE_SKIP_EXTENSIONS")
}

/// Get the dev-build suffix number (`DEV_BUILD`).
///
/// When set, the reported version gains a `.dev<N>` suffix so test
/// uploads never collide with a previously published file name.
pub fn dev_build() -> Option<String> {
    env::var("DEV_BUILD").ok().filter(|s| !s.is_empty())
}
