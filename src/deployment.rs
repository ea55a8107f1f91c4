//! macOS deployment-target floor
//!
//! Compilers need a deployment target of at least 10.9 to find the
//! libstdc++/libc++ headers. If `MACOSX_DEPLOYMENT_TARGET` resolves to
//! something older, the process re-executes itself once with the floor
//! forced into the environment. The relaunch marker prevents a loop
//! when an external mechanism keeps reasserting the old value.

use crate::env_vars;
use crate::platform::{OsFamily, PlatformProfile};
use crate::runner::{Invocation, ProcessRunner};

/// Minimum supported deployment target
pub const MIN_TARGET: &str = "10.9";

/// What the deployment-target check decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDecision {
    /// Not macOS, nothing to enforce
    NotApplicable,
    /// Resolved target meets the floor; value kept as-is
    Satisfied(String),
    /// Resolved target is older than the floor; re-exec with `MIN_TARGET`
    Relaunch,
    /// Floor still unmet after one relaunch; warn and keep going
    AlreadyRelaunched(String),
}

/// Parse a dotted version string into numeric parts
///
/// Non-numeric parts poison the comparison by parsing as 0, matching a
/// lenient "anything unparseable is ancient" reading.
fn parse_version(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

fn older_than_min(version: &str) -> bool {
    parse_version(version) < parse_version(MIN_TARGET)
}

/// Decide what to do about the deployment target
///
/// `resolved` is the target from the environment, falling back to the
/// toolchain default; `relaunched` is whether a forced re-exec already
/// happened this build.
#[must_use]
pub fn decide(profile: &PlatformProfile, resolved: Option<&str>, relaunched: bool) -> TargetDecision {
    if profile.os != OsFamily::Darwin {
        return TargetDecision::NotApplicable;
    }
    match resolved {
        Some(target) if older_than_min(target) => {
            if relaunched {
                TargetDecision::AlreadyRelaunched(target.to_string())
            } else {
                TargetDecision::Relaunch
            }
        }
        Some(target) => TargetDecision::Satisfied(target.to_string()),
        // No value anywhere; the compiler's own default applies
        None => TargetDecision::Satisfied(MIN_TARGET.to_string()),
    }
}

/// Resolve the effective deployment target for the current environment
///
/// Environment override first; otherwise ask the toolchain for its SDK
/// default. A toolchain that cannot answer yields `None`.
pub fn resolve_target(runner: &dyn ProcessRunner) -> Option<String> {
    if let Some(target) = env_vars::deployment_target() {
        return Some(target);
    }

    let invocation = Invocation::new("xcrun", &["--sdk", "macosx", "--show-sdk-version"]);
    match runner.run(&invocation) {
        Ok(result) if result.success() => {
            let version = result.output.trim().to_string();
            (!version.is_empty()).then_some(version)
        }
        Ok(_) | Err(_) => None,
    }
}

/// Enforce the floor, re-executing the current process if required
///
/// Returns only when no re-exec is needed; on the `Relaunch` decision
/// this function does not return (the process image is replaced).
pub fn ensure_target(runner: &dyn ProcessRunner, profile: &PlatformProfile) -> TargetDecision {
    // The platform gate comes first: no toolchain query may happen on
    // platforms the floor does not apply to.
    if profile.os != OsFamily::Darwin {
        return TargetDecision::NotApplicable;
    }
    let resolved = resolve_target(runner);
    let decision = decide(profile, resolved.as_deref(), env_vars::relaunched());

    match &decision {
        TargetDecision::Relaunch => {
            crate::debug!("deployment target below {MIN_TARGET}, re-executing");
            relaunch_with_floor();
        }
        TargetDecision::AlreadyRelaunched(target) => {
            eprintln!(
                "warning: MACOSX_DEPLOYMENT_TARGET is still {target} after relaunch; \
                 leaving it alone"
            );
        }
        _ => {}
    }
    decision
}

/// Replace the process image with the floor forced into the environment
///
/// One-shot by construction: the relaunched process carries the marker
/// checked by [`decide`]. No-op on non-unix hosts.
#[cfg(unix)]
fn relaunch_with_floor() {
    use std::os::unix::process::CommandExt;

    let mut args = std::env::args();
    let Some(program) = args.next() else { return };

    let err = std::process::Command::new(program)
        .args(args)
        .env("MACOSX_DEPLOYMENT_TARGET", MIN_TARGET)
        .env("EXTFORGE_RELAUNCHED", "1")
        .exec();

    // exec only returns on failure
    eprintln!("warning: failed to re-execute for deployment target: {err}");
}

#[cfg(not(unix))]
fn relaunch_with_floor() {}
