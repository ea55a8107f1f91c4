//! Build pipeline
//!
//! The ordered lifecycle steps that compose everything else: fetch
//! vendored dependencies, probe compiler architectures, compile
//! extension modules, drive the external make for the shared library,
//! and copy every artifact into its destination trees. Each step is
//! gated by a precondition on the platform profile and runs to
//! completion (including all child processes) before the next begins.
//! Any fatal step aborts the pipeline; nothing is retried.

use crate::env_vars;
use crate::error::BuildError;
use crate::placement::{self, InstallMode, PathRoots};
use crate::platform::PlatformProfile;
use crate::probe::{self, ArchFlagSet, CANDIDATE_ARCHS};
use crate::runner::{Invocation, ProcessRunner};
use crate::toolchain::{self, Toolchain};
use crate::units::{BuildUnit, Registry, UnitKind};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Pipeline lifecycle steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Fetch vendored third-party sources through the external make
    VendorFetch,
    /// Discover multi-arch compiler support
    ArchProbe,
    /// Compile every enabled extension module
    CompileExtensions,
    /// Drive the external make to produce the shared library
    BuildSharedLibrary,
    /// Copy artifacts to every destination
    PlaceArtifacts,
}

impl Step {
    /// Execution order; no step ever runs out of sequence
    pub const ORDER: [Self; 5] = [
        Self::VendorFetch,
        Self::ArchProbe,
        Self::CompileExtensions,
        Self::BuildSharedLibrary,
        Self::PlaceArtifacts,
    ];

    /// Whether this step runs at all on the given platform
    #[must_use]
    pub const fn applies(&self, profile: &PlatformProfile) -> bool {
        match self {
            Self::VendorFetch | Self::BuildSharedLibrary => profile.uses_external_make,
            Self::ArchProbe => profile.supports_multiarch,
            Self::CompileExtensions => profile.builds_native_units(),
            Self::PlaceArtifacts => true,
        }
    }

    /// Step name for diagnostics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::VendorFetch => "vendor-fetch",
            Self::ArchProbe => "arch-probe",
            Self::CompileExtensions => "compile-extensions",
            Self::BuildSharedLibrary => "build-shared-library",
            Self::PlaceArtifacts => "place-artifacts",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Options for one pipeline invocation
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Packaged or editable placement
    pub mode: InstallMode,
    /// Print step-by-step progress
    pub verbose: bool,
    /// Skip extension-module compiles entirely
    pub skip_extensions: bool,
}

/// What a completed pipeline produced
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Arch flags shared by every unit in this invocation
    pub arch_flags: ArchFlagSet,
    /// Names of extension modules compiled
    pub compiled_modules: Vec<String>,
    /// Names of shared libraries built through make
    pub built_libraries: Vec<String>,
    /// Every destination path an artifact was copied to
    pub placed: Vec<PathBuf>,
}

/// Terminal pipeline state
#[derive(Debug)]
pub enum Outcome {
    /// Every applicable step completed
    Done(Report),
    /// A fatal step stopped the build; nothing after it ran
    Aborted {
        /// Step that failed
        step: Step,
        /// Why, with external diagnostics intact
        error: BuildError,
    },
}

impl Outcome {
    /// Report if the pipeline completed
    #[must_use]
    pub const fn report(&self) -> Option<&Report> {
        match self {
            Self::Done(report) => Some(report),
            Self::Aborted { .. } => None,
        }
    }
}

/// One build-pipeline invocation
///
/// The pipeline is the only component with side effects on the outside
/// world; probing and placement resolution are pure queries it calls.
/// Single-threaded and synchronous throughout.
#[derive(Debug)]
pub struct Pipeline<'a> {
    runner: &'a dyn ProcessRunner,
    profile: PlatformProfile,
    /// Resolved only on platforms that build native units
    toolchain: Option<Toolchain>,
    registry: Registry,
    roots: PathRoots,
    source_root: PathBuf,
    vendor_target: String,
    options: BuildOptions,

    // Per-invocation state, written once by their producing steps
    arch_flags: ArchFlagSet,
    artifacts: Vec<(BuildUnit, PathBuf)>,
    report: Report,
}

impl<'a> Pipeline<'a> {
    /// Assemble a pipeline for one build invocation
    ///
    /// `toolchain` must be resolved by the caller on platforms that
    /// build native units; a missing one is a configuration error
    /// reported before any process is spawned.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        runner: &'a dyn ProcessRunner,
        profile: PlatformProfile,
        toolchain: Option<Toolchain>,
        registry: Registry,
        roots: PathRoots,
        source_root: PathBuf,
        vendor_target: String,
        options: BuildOptions,
    ) -> Result<Self, BuildError> {
        if profile.builds_native_units() && toolchain.is_none() {
            return Err(BuildError::Configuration(
                "no toolchain resolved for this platform".to_string(),
            ));
        }

        Ok(Self {
            runner,
            profile,
            toolchain,
            registry,
            roots,
            source_root,
            vendor_target,
            options,
            arch_flags: ArchFlagSet::empty(),
            artifacts: Vec::new(),
            report: Report::default(),
        })
    }

    /// Run every applicable step, in order, to a terminal state
    pub fn run(mut self) -> Outcome {
        for step in Step::ORDER {
            if !step.applies(&self.profile) {
                crate::debug!("skipping {step} on {}", self.profile.os);
                continue;
            }
            if let Err(error) = self.execute(step) {
                return Outcome::Aborted { step, error };
            }
        }
        self.report.arch_flags = std::mem::take(&mut self.arch_flags);
        Outcome::Done(self.report)
    }

    fn execute(&mut self, step: Step) -> Result<(), BuildError> {
        if self.options.verbose {
            println!("[{step}]");
        }
        match step {
            Step::VendorFetch => self.vendor_fetch(),
            Step::ArchProbe => self.arch_probe(),
            Step::CompileExtensions => self.compile_extensions(),
            Step::BuildSharedLibrary => self.build_shared_library(),
            Step::PlaceArtifacts => self.place_artifacts(),
        }
    }

    fn toolchain(&self) -> Result<&Toolchain, BuildError> {
        self.toolchain.as_ref().ok_or_else(|| {
            BuildError::Configuration("no toolchain resolved for this platform".to_string())
        })
    }

    /// Run an external tool, treating spawn failure and nonzero exit as fatal
    fn run_fatal(&self, invocation: &Invocation) -> Result<String, BuildError> {
        crate::debug!("running: {invocation}");
        let result = self
            .runner
            .run(invocation)
            .map_err(|e| BuildError::external(invocation.program.clone(), None, e.to_string()))?;
        if !result.success() {
            return Err(BuildError::external(
                invocation.program.clone(),
                result.code,
                result.output,
            ));
        }
        Ok(result.output)
    }

    /// Step 1: fetch vendored dependency sources
    ///
    /// No partial build may proceed without them, so failure is fatal.
    fn vendor_fetch(&mut self) -> Result<(), BuildError> {
        let make = self.toolchain()?.make.clone();
        let invocation = Invocation::new(make, &[self.vendor_target.as_str()])
            .in_dir(&self.source_root);
        self.run_fatal(&invocation)?;
        Ok(())
    }

    /// Step 2: probe which architectures the real compiler supports
    ///
    /// Asks the same C++ compiler the compile step will invoke; the
    /// choice can be overridden by environment at build time, so it is
    /// read from the resolved toolchain, never assumed. The one result
    /// is shared by every subsequent step; reusing it for C compilation
    /// and linking is a documented limitation.
    fn arch_probe(&mut self) -> Result<(), BuildError> {
        let cxx = self.toolchain()?.cxx.clone();
        if self.options.verbose {
            println!("Compiler: {}", cxx.display());
        }
        self.arch_flags = probe::probe(self.runner, &cxx, CANDIDATE_ARCHS)
            .map_err(|e| BuildError::Configuration(format!("cannot probe {}: {e}", cxx.display())))?;
        if self.options.verbose {
            println!(
                "Discovered {} arch flags: {}",
                cxx.display(),
                self.arch_flags
            );
        }
        Ok(())
    }

    /// Step 3: compile every enabled extension module
    ///
    /// Static unit flags + the platform language-standard flag + the
    /// probed arch flags (compile and link alike). Any unit failing is
    /// fatal; there is no partial success across units.
    fn compile_extensions(&mut self) -> Result<(), BuildError> {
        if self.options.skip_extensions {
            if self.options.verbose {
                println!("Skipping extension modules");
            }
            return Ok(());
        }

        let cxx = self.toolchain()?.cxx.clone();
        let units: Vec<BuildUnit> = self
            .registry
            .enabled_of_kind(UnitKind::ExtensionModule, &self.profile)
            .cloned()
            .collect();

        for unit in units {
            toolchain::check_sources(&unit.name, &unit.sources, &self.source_root)?;
            fs::create_dir_all(&self.roots.build_temp).map_err(|e| BuildError::Placement {
                destination: self.roots.build_temp.clone(),
                source: e,
            })?;

            let artifact = self.roots.build_temp.join(unit.artifact_filename(&self.profile));
            let args = self.module_compile_args(&unit, &artifact);
            let invocation =
                Invocation::with_args(cxx.to_string_lossy().into_owned(), args)
                    .in_dir(&self.source_root);

            if self.options.verbose {
                println!("Compiling {} ({})", unit.name, unit.kind.description());
            }
            self.run_fatal(&invocation)?;

            self.report.compiled_modules.push(unit.name.clone());
            self.artifacts.push((unit, artifact));
        }
        Ok(())
    }

    /// Full driver argument list for one extension-module compile
    ///
    /// `CXXFLAGS` and `LDFLAGS` from the environment are appended after
    /// the unit's own flags, matching what an outer build tool expects.
    fn module_compile_args(&self, unit: &BuildUnit, artifact: &std::path::Path) -> Vec<String> {
        let mut args = vec![self.profile.std_flag.to_string()];
        args.extend(unit.compile_flags.iter().cloned());
        if let Some(cxxflags) = env_vars::cxxflags() {
            args.extend(cxxflags.split_whitespace().map(str::to_string));
        }
        for dir in &unit.include_dirs {
            args.push(format!("-I{}", dir.display()));
        }
        // One combined compile+link invocation; the driver applies the
        // arch flags to both phases
        args.extend(self.arch_flags.as_args());
        args.push("-shared".to_string());
        args.push("-fPIC".to_string());
        for source in &unit.sources {
            args.push(source.display().to_string());
        }
        args.extend(unit.link_flags.iter().cloned());
        if let Some(ldflags) = env_vars::ldflags() {
            args.extend(ldflags.split_whitespace().map(str::to_string));
        }
        args.push("-o".to_string());
        args.push(artifact.display().to_string());
        args
    }

    /// Step 4: build each shared library through the external make
    ///
    /// Fixed argument contract: output directory and the arch flag list
    /// as key=value parameters. Exactly one make run per library unit
    /// per invocation, with the same `ArchFlagSet` the module compiles
    /// used.
    fn build_shared_library(&mut self) -> Result<(), BuildError> {
        let make = self.toolchain()?.make.clone();
        let units: Vec<BuildUnit> = self
            .registry
            .enabled_of_kind(UnitKind::SharedLibrary, &self.profile)
            .cloned()
            .collect();

        for unit in units {
            fs::create_dir_all(&self.roots.build_temp).map_err(|e| BuildError::Placement {
                destination: self.roots.build_temp.clone(),
                source: e,
            })?;
            fs::create_dir_all(&self.roots.build_lib).map_err(|e| BuildError::Placement {
                destination: self.roots.build_lib.clone(),
                source: e,
            })?;

            let filename = unit.artifact_filename(&self.profile);
            if self.options.verbose {
                println!("Building {filename} via {make}");
            }

            let invocation = Invocation::with_args(
                make.clone(),
                vec![
                    format!("OUTDIR={}", self.roots.build_temp.display()),
                    format!("ARCH={}", self.arch_flags),
                ],
            )
            .in_dir(&self.source_root);
            let output = self.run_fatal(&invocation)?;

            let artifact = self.roots.build_temp.join(&filename);
            if !artifact.exists() {
                return Err(BuildError::external(
                    make.clone(),
                    Some(0),
                    format!("{output}\nexpected artifact {} was not produced", artifact.display()),
                ));
            }

            self.report.built_libraries.push(unit.name.clone());
            self.artifacts.push((unit, artifact));
        }
        Ok(())
    }

    /// Step 5: copy every built artifact to its destination set
    fn place_artifacts(&mut self) -> Result<(), BuildError> {
        for (unit, artifact) in &self.artifacts {
            let dests =
                placement::destinations(unit, self.options.mode, &self.roots, &self.profile);
            placement::place(artifact, &dests)?;
            if self.options.verbose {
                for dest in &dests {
                    println!("Placed {} -> {}", unit.name, dest.display());
                }
            }
            self.report.placed.extend(dests);
        }
        Ok(())
    }
}
