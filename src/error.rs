//! Build error taxonomy
//!
//! Three failure classes cover everything the pipeline can hit:
//! configuration problems (detectable before any process is spawned),
//! external tool failures (make, compilers), and artifact placement
//! failures. A single architecture failing to probe is deliberately
//! *not* an error; it is just absence of support.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal build pipeline errors
///
/// External tool output is carried through unmodified so the developer
/// sees the real compiler/linker diagnostics, not a paraphrase.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Missing compiler, missing source file, missing or invalid manifest
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An external tool (make, compiler) exited nonzero or failed to spawn
    #[error("{program} failed{}\n{output}", .code.map_or_else(String::new, |c| format!(" with exit code {c}")))]
    ExternalTool {
        /// Program that failed (e.g. "make", "clang++")
        program: String,
        /// Exit code if the process ran at all
        code: Option<i32>,
        /// Combined stdout + stderr, passed through verbatim
        output: String,
    },

    /// A built artifact could not be copied into a destination tree
    #[error("failed to place artifact at {}: {source}", .destination.display())]
    Placement {
        /// Destination path that could not be written
        destination: PathBuf,
        /// Underlying filesystem error
        source: std::io::Error,
    },
}

impl BuildError {
    /// Build an `ExternalTool` error from a finished process
    #[must_use]
    pub fn external(program: impl Into<String>, code: Option<i32>, output: impl Into<String>) -> Self {
        Self::ExternalTool {
            program: program.into(),
            code,
            output: output.into(),
        }
    }
}
