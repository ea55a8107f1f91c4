//! Compiler capability probing
//!
//! Discovers which architectures a compiler can target by attempting a
//! trivial compile per candidate, in order. An architecture that fails
//! to compile is not an error, just absent from the result.
//!
//! Known limitation: only one compiler is probed (the resolved C++
//! compiler) and its flag set is reused for C compilation and linking
//! as well. If the toolchain's C and C++ compilers diverge in supported
//! architectures the link step will surface the mismatch.

use crate::runner::{Invocation, ProcessRunner};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Candidate architectures probed on multi-arch platforms, in order
pub const CANDIDATE_ARCHS: &[&str] = &["x86_64", "arm64", "arm64e"];

/// Trivial translation unit used for probe compiles
const PROBE_SOURCE: &str = "int main() {return 0;}\n";

/// Ordered multi-architecture flag set, e.g. `-arch x86_64 -arch arm64`
///
/// Computed once per build invocation and shared by every unit compiled
/// in it; compile and link flags must carry the same set or the link
/// step fails with an architecture mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchFlagSet {
    pairs: Vec<(String, String)>,
}

impl ArchFlagSet {
    /// Empty set (platforms without fat-binary support)
    #[must_use]
    pub const fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Build a set from architecture names
    #[must_use]
    pub fn from_archs<S: AsRef<str>>(archs: impl IntoIterator<Item = S>) -> Self {
        Self {
            pairs: archs
                .into_iter()
                .map(|arch| ("-arch".to_string(), arch.as_ref().to_string()))
                .collect(),
        }
    }

    /// Append one architecture's flag pair
    pub fn push(&mut self, arch: &str) {
        self.pairs.push(("-arch".to_string(), arch.to_string()));
    }

    /// Whether no architecture was discovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Flag pairs in discovery order
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Flatten into command-line arguments (`-arch`, `x86_64`, ...)
    #[must_use]
    pub fn as_args(&self) -> Vec<String> {
        self.pairs
            .iter()
            .flat_map(|(flag, value)| [flag.clone(), value.clone()])
            .collect()
    }

    /// Architecture names only, in discovery order
    #[must_use]
    pub fn archs(&self) -> Vec<&str> {
        self.pairs.iter().map(|(_, value)| value.as_str()).collect()
    }
}

impl fmt::Display for ArchFlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_args().join(" "))
    }
}

/// Probe which of `candidates` the given compiler can target
///
/// For each candidate, in order: write a minimal translation unit to a
/// fresh scoped temporary directory, compile it for that single
/// architecture through `runner`, and keep the flag pair on exit 0.
/// A nonzero exit just excludes the candidate; a compiler that cannot
/// be found at all is an error, since every candidate would fail the
/// same way. The temporary directory is released on every exit path.
pub fn probe(
    runner: &dyn ProcessRunner,
    compiler: &Path,
    candidates: &[&str],
) -> std::io::Result<ArchFlagSet> {
    crate::debug!("probing {} for {:?}", compiler.display(), candidates);
    let mut flags = ArchFlagSet::empty();

    for arch in candidates {
        let tmpdir = TempDir::new()?;
        let cpp = tmpdir.path().join("test.cxx");
        let out = tmpdir.path().join("a.out");

        let mut file = std::fs::File::create(&cpp)?;
        file.write_all(PROBE_SOURCE.as_bytes())?;

        let invocation = Invocation::with_args(
            compiler.to_string_lossy().into_owned(),
            vec![
                "-arch".to_string(),
                (*arch).to_string(),
                cpp.to_string_lossy().into_owned(),
                "-o".to_string(),
                out.to_string_lossy().into_owned(),
            ],
        );

        match runner.run(&invocation) {
            Ok(result) if result.success() => flags.push(arch),
            Ok(_) => {}
            // A compiler that does not exist is a setup problem, not a
            // rejected architecture; other spawn failures only exclude
            // the candidate.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(e),
            Err(_) => {}
        }
        // tmpdir dropped here, files deleted regardless of outcome
    }

    crate::debug!("discovered {} arch flags: {flags}", compiler.display());
    Ok(flags)
}
