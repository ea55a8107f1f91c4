//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration
//! tests: a scripted process runner standing in for make and the C++
//! compiler, and fixture helpers for fake source trees.

use extforge::placement::PathRoots;
use extforge::runner::{Invocation, ProcessRunner, RunOutput};
use extforge::units::{BuildUnit, UnitKind};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Compiler path used by scripted-toolchain tests
pub(crate) const FAKE_CXX: &str = "fake-clang++";

/// Scripted stand-in for every external process the pipeline spawns
///
/// Records each invocation in order and simulates make and compiler
/// behavior: probe compiles succeed per the accepted-architecture list,
/// module compiles create the `-o` target file, and the library make
/// run creates the configured filenames under its `OUTDIR=` parameter.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRunner {
    /// Architectures the fake compiler accepts for probe compiles
    pub accepted_archs: Vec<&'static str>,
    /// Filenames the fake make creates under OUTDIR (library build runs)
    pub make_produces: Vec<String>,
    /// Fail the vendor-fetch make run
    pub fail_vendor: bool,
    /// Make every compiler spawn fail as if the executable were absent
    pub compiler_missing: bool,
    /// Fail every module compile
    pub fail_compile: bool,
    /// Every invocation, in arrival order
    pub log: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub(crate) fn invocations(&self) -> Vec<Invocation> {
        self.log.borrow().clone()
    }

    /// Invocations of the fake compiler only
    pub(crate) fn compiler_invocations(&self) -> Vec<Invocation> {
        self.invocations()
            .into_iter()
            .filter(|i| i.program == FAKE_CXX)
            .collect()
    }

    /// Invocations of make only
    pub(crate) fn make_invocations(&self) -> Vec<Invocation> {
        self.invocations()
            .into_iter()
            .filter(|i| i.program == "make")
            .collect()
    }

    fn exit(code: i32, output: &str) -> std::io::Result<RunOutput> {
        Ok(RunOutput {
            code: Some(code),
            output: output.to_string(),
        })
    }

    fn run_make(&self, invocation: &Invocation) -> std::io::Result<RunOutput> {
        let is_vendor = invocation.args.iter().any(|a| a == "vendor-deps");
        if is_vendor {
            if self.fail_vendor {
                return Self::exit(2, "make: *** [vendor-deps] Error 2\n");
            }
            return Self::exit(0, "");
        }

        // Library build: create the promised artifacts under OUTDIR
        let outdir = invocation
            .args
            .iter()
            .find_map(|a| a.strip_prefix("OUTDIR="))
            .map(PathBuf::from);
        if let Some(outdir) = outdir {
            fs::create_dir_all(&outdir)?;
            for filename in &self.make_produces {
                fs::write(outdir.join(filename), format!("built {filename}"))?;
            }
        }
        Self::exit(0, "")
    }

    fn run_compiler(&self, invocation: &Invocation) -> std::io::Result<RunOutput> {
        if self.compiler_missing {
            return Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        }
        let is_probe = invocation.args.iter().any(|a| a.ends_with("test.cxx"));
        if is_probe {
            let arch = invocation
                .args
                .iter()
                .skip_while(|a| a.as_str() != "-arch")
                .nth(1)
                .cloned()
                .unwrap_or_default();
            if self.accepted_archs.contains(&arch.as_str()) {
                return Self::exit(0, "");
            }
            return Self::exit(1, &format!("error: unsupported arch '{arch}'\n"));
        }

        // Real module compile: honor -o by creating the artifact
        if self.fail_compile {
            return Self::exit(1, "error: expected ';' before '}' token\n");
        }
        let out = invocation
            .args
            .iter()
            .skip_while(|a| a.as_str() != "-o")
            .nth(1)
            .map(PathBuf::from);
        if let Some(out) = out {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out, b"compiled module")?;
        }
        Self::exit(0, "")
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<RunOutput> {
        self.log.borrow_mut().push(invocation.clone());
        match invocation.program.as_str() {
            "make" => self.run_make(invocation),
            FAKE_CXX => self.run_compiler(invocation),
            other => Self::exit(0, &format!("{other}: ok\n")),
        }
    }
}

/// A fake project tree: one extension-module source plus path roots
pub(crate) struct ProjectFixture {
    pub dir: TempDir,
    pub units: Vec<BuildUnit>,
}

impl ProjectFixture {
    /// One extension module (`fastline`) and one shared library (`trace`)
    pub(crate) fn with_module_and_library() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let native = dir.path().join("native");
        fs::create_dir_all(&native).expect("failed to create native dir");
        fs::write(native.join("fastline.cpp"), "int main() {return 0;}\n")
            .expect("failed to write source");

        let units = vec![
            BuildUnit {
                name: "fastline".to_string(),
                kind: UnitKind::ExtensionModule,
                include_dirs: vec![PathBuf::from(".")],
                sources: vec![PathBuf::from("native/fastline.cpp")],
                compile_flags: vec!["-fvisibility=hidden".to_string()],
                link_flags: vec![],
                binary_compat: true,
            },
            BuildUnit {
                name: "trace".to_string(),
                kind: UnitKind::SharedLibrary,
                include_dirs: vec![],
                sources: vec![],
                compile_flags: vec![],
                link_flags: vec![],
                binary_compat: false,
            },
        ];

        Self { dir, units }
    }

    pub(crate) fn roots(&self) -> PathRoots {
        PathRoots::anchored(
            self.dir.path(),
            Path::new("build/temp"),
            Path::new("build/lib"),
            Path::new("src/trace"),
        )
    }
}
