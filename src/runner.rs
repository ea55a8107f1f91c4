//! External process invocation port
//!
//! Every subprocess the orchestrator spawns (make, compilers, probe
//! compiles) goes through the [`ProcessRunner`] trait, so the pipeline's
//! ordering and flag logic can be exercised in tests with a scripted
//! runner instead of real subprocess execution.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// One requested external process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run (resolved executable name or path)
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Working directory, if different from the current one
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Build an invocation in the current working directory
    #[must_use]
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(ToString::to_string).collect(),
            cwd: None,
        }
    }

    /// Build an invocation from owned arguments
    #[must_use]
    pub fn with_args(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
        }
    }

    /// Set the working directory
    #[must_use]
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished external process
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, if the process terminated normally
    pub code: Option<i32>,
    /// Combined stdout + stderr, in arrival order per stream
    pub output: String,
}

impl RunOutput {
    /// Whether the process exited 0
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability to run external processes synchronously
///
/// Implementations must observe the child's exit status before
/// returning; no detached or background processes.
pub trait ProcessRunner: fmt::Debug {
    /// Run to completion, capturing exit status and output
    ///
    /// A spawn failure (program not found) is an `Err`; a nonzero exit
    /// is an `Ok` whose [`RunOutput::success`] is false, and the caller
    /// decides whether that is fatal.
    fn run(&self, invocation: &Invocation) -> std::io::Result<RunOutput>;
}

/// Real subprocess runner backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<RunOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        let out = cmd.output()?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(RunOutput {
            code: out.status.code(),
            output,
        })
    }
}
