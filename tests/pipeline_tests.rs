//! End-to-end pipeline tests with a scripted process runner
//!
//! Exercises step ordering, architecture-flag consistency, platform
//! preconditions, and placement behavior without touching a real
//! compiler or make.

mod common;

use common::{FAKE_CXX, ProjectFixture, ScriptedRunner};
use extforge::pipeline::{BuildOptions, Outcome, Pipeline, Step};
use extforge::placement::InstallMode;
use extforge::platform::{OsFamily, PlatformProfile};
use extforge::toolchain::Toolchain;
use extforge::units::Registry;
use std::path::PathBuf;

fn options(mode: InstallMode) -> BuildOptions {
    BuildOptions {
        mode,
        verbose: false,
        skip_extensions: false,
    }
}

fn fake_toolchain() -> Option<Toolchain> {
    Some(Toolchain {
        cxx: PathBuf::from(FAKE_CXX),
        make: "make".to_string(),
    })
}

fn pipeline<'a>(
    runner: &'a ScriptedRunner,
    profile: PlatformProfile,
    fixture: &ProjectFixture,
    mode: InstallMode,
) -> Pipeline<'a> {
    let toolchain = profile.builds_native_units().then(fake_toolchain).flatten();
    Pipeline::new(
        runner,
        profile,
        toolchain,
        Registry::new(fixture.units.clone()),
        fixture.roots(),
        fixture.dir.path().to_path_buf(),
        "vendor-deps".to_string(),
        options(mode),
    )
    .expect("pipeline construction failed")
}

#[test]
fn darwin_build_shares_one_arch_flag_set_across_all_units() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner {
        accepted_archs: vec!["x86_64", "arm64"],
        make_produces: vec!["libtrace.dylib".to_string()],
        ..Default::default()
    };
    let darwin = PlatformProfile::for_os(OsFamily::Darwin);

    let outcome = pipeline(&runner, darwin, &fixture, InstallMode::Packaged).run();
    assert!(matches!(outcome, Outcome::Done(_)), "expected Done, got {outcome:?}");
    let Outcome::Done(report) = outcome else { return };

    // arm64e was rejected by the fake compiler
    assert_eq!(report.arch_flags.archs(), vec!["x86_64", "arm64"]);
    assert_eq!(report.compiled_modules, vec!["fastline".to_string()]);
    assert_eq!(report.built_libraries, vec!["trace".to_string()]);

    // The module compile is one combined compile+link invocation, so
    // the probed flags appear exactly once in it
    let expected_args = ["-arch", "x86_64", "-arch", "arm64"];
    let module_compile = runner
        .compiler_invocations()
        .into_iter()
        .find(|i| i.args.iter().any(|a| a == "-shared"))
        .expect("no module compile recorded");
    let arch_occurrences = module_compile
        .args
        .windows(expected_args.len())
        .filter(|w| w.iter().map(String::as_str).eq(expected_args.iter().copied()))
        .count();
    assert_eq!(arch_occurrences, 1, "one arch flag set per driver invocation");

    // The make library build receives the identical flag list
    let make_lib = runner
        .make_invocations()
        .into_iter()
        .find(|i| i.args.iter().any(|a| a.starts_with("ARCH=")))
        .expect("no library make run recorded");
    assert!(
        make_lib
            .args
            .iter()
            .any(|a| a == "ARCH=-arch x86_64 -arch arm64")
    );
}

#[test]
fn vendor_fetch_failure_aborts_before_any_compiler_runs() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner {
        accepted_archs: vec!["x86_64"],
        fail_vendor: true,
        ..Default::default()
    };
    let darwin = PlatformProfile::for_os(OsFamily::Darwin);

    let outcome = pipeline(&runner, darwin, &fixture, InstallMode::Packaged).run();
    assert!(
        matches!(outcome, Outcome::Aborted { .. }),
        "expected Aborted, got {outcome:?}"
    );
    let Outcome::Aborted { step, error } = outcome else { return };

    assert_eq!(step, Step::VendorFetch);
    // The external tool's diagnostics come through unmodified
    assert!(error.to_string().contains("Error 2"));
    assert!(runner.compiler_invocations().is_empty());
    assert_eq!(runner.make_invocations().len(), 1);
}

#[test]
fn vanished_compiler_aborts_the_probe_as_a_configuration_error() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner {
        compiler_missing: true,
        ..Default::default()
    };
    let darwin = PlatformProfile::for_os(OsFamily::Darwin);

    let outcome = pipeline(&runner, darwin, &fixture, InstallMode::Packaged).run();
    assert!(
        matches!(outcome, Outcome::Aborted { .. }),
        "expected Aborted, got {outcome:?}"
    );
    let Outcome::Aborted { step, error } = outcome else { return };

    assert_eq!(step, Step::ArchProbe);
    assert!(matches!(error, extforge::BuildError::Configuration(_)));
}

#[test]
fn windows_spawns_no_external_processes() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner::default();
    let windows = PlatformProfile::for_os(OsFamily::Windows);

    let outcome = pipeline(&runner, windows, &fixture, InstallMode::Editable).run();
    assert!(matches!(outcome, Outcome::Done(_)), "expected Done, got {outcome:?}");
    let Outcome::Done(report) = outcome else { return };

    assert!(runner.invocations().is_empty());
    assert!(report.compiled_modules.is_empty());
    assert!(report.built_libraries.is_empty());
    assert!(report.placed.is_empty());
    assert!(report.arch_flags.is_empty());
}

#[test]
fn linux_build_skips_probe_and_passes_empty_arch() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner {
        make_produces: vec!["libtrace.so".to_string()],
        ..Default::default()
    };
    let linux = PlatformProfile::for_os(OsFamily::Linux);

    let outcome = pipeline(&runner, linux, &fixture, InstallMode::Packaged).run();
    assert!(matches!(outcome, Outcome::Done(_)), "expected Done, got {outcome:?}");
    let Outcome::Done(report) = outcome else { return };

    assert!(report.arch_flags.is_empty());
    // No probe compiles: the only compiler run is the module compile
    assert_eq!(runner.compiler_invocations().len(), 1);
    let make_lib = runner
        .make_invocations()
        .into_iter()
        .find(|i| i.args.iter().any(|a| a.starts_with("ARCH")))
        .expect("no library make run recorded");
    assert!(make_lib.args.iter().any(|a| a == "ARCH="));
}

#[test]
fn compile_failure_is_fatal_and_stops_before_the_library_build() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner {
        fail_compile: true,
        make_produces: vec!["libtrace.so".to_string()],
        ..Default::default()
    };
    let linux = PlatformProfile::for_os(OsFamily::Linux);

    let outcome = pipeline(&runner, linux, &fixture, InstallMode::Packaged).run();
    assert!(
        matches!(outcome, Outcome::Aborted { .. }),
        "expected Aborted, got {outcome:?}"
    );
    let Outcome::Aborted { step, error } = outcome else { return };

    assert_eq!(step, Step::CompileExtensions);
    assert!(error.to_string().contains("expected ';'"));
    // Vendor fetch ran, the library build did not
    assert_eq!(runner.make_invocations().len(), 1);
}

#[test]
fn editable_mode_places_into_both_trees() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner {
        make_produces: vec!["libtrace.so".to_string()],
        ..Default::default()
    };
    let linux = PlatformProfile::for_os(OsFamily::Linux);

    let outcome = pipeline(&runner, linux, &fixture, InstallMode::Editable).run();
    assert!(matches!(outcome, Outcome::Done(_)));

    let build_lib = fixture.dir.path().join("build/lib");
    let package_dir = fixture.dir.path().join("src/trace");
    for dir in [&build_lib, &package_dir] {
        assert!(dir.join("fastline.so").exists(), "missing in {}", dir.display());
        assert!(dir.join("libtrace.so").exists(), "missing in {}", dir.display());
    }
}

#[test]
fn packaged_mode_leaves_the_source_tree_alone() {
    let fixture = ProjectFixture::with_module_and_library();
    let runner = ScriptedRunner {
        make_produces: vec!["libtrace.so".to_string()],
        ..Default::default()
    };
    let linux = PlatformProfile::for_os(OsFamily::Linux);

    let outcome = pipeline(&runner, linux, &fixture, InstallMode::Packaged).run();
    assert!(matches!(outcome, Outcome::Done(_)));

    assert!(fixture.dir.path().join("build/lib/libtrace.so").exists());
    assert!(!fixture.dir.path().join("src/trace").exists());
}

#[test]
fn rerunning_the_pipeline_reproduces_identical_artifacts() {
    let fixture = ProjectFixture::with_module_and_library();
    let linux = PlatformProfile::for_os(OsFamily::Linux);

    for _ in 0..2 {
        let runner = ScriptedRunner {
            make_produces: vec!["libtrace.so".to_string()],
            ..Default::default()
        };
        let outcome = pipeline(&runner, linux, &fixture, InstallMode::Editable).run();
        assert!(matches!(outcome, Outcome::Done(_)));
    }

    let placed = fixture.dir.path().join("build/lib/libtrace.so");
    let in_source = fixture.dir.path().join("src/trace/libtrace.so");
    assert_eq!(
        std::fs::read(&placed).unwrap(),
        std::fs::read(&in_source).unwrap()
    );
    assert_eq!(std::fs::read(&placed).unwrap(), b"built libtrace.so");
}

#[test]
fn missing_source_file_aborts_before_spawning_the_compiler() {
    let mut fixture = ProjectFixture::with_module_and_library();
    if let Some(unit) = fixture.units.first_mut() {
        unit.sources = vec![PathBuf::from("native/not_there.cpp")];
    }
    let runner = ScriptedRunner::default();
    let linux = PlatformProfile::for_os(OsFamily::Linux);

    let outcome = pipeline(&runner, linux, &fixture, InstallMode::Packaged).run();
    assert!(
        matches!(outcome, Outcome::Aborted { .. }),
        "expected Aborted, got {outcome:?}"
    );
    let Outcome::Aborted { step, error } = outcome else { return };

    assert_eq!(step, Step::CompileExtensions);
    assert!(matches!(error, extforge::BuildError::Configuration(_)));
    assert!(runner.compiler_invocations().is_empty());
}
