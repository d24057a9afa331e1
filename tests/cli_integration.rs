//! CLI integration tests for slipway.
//!
//! These drive the binary end to end: recipe listing, spec resolution
//! against a configured toolchain/provider set, and the error paths a
//! user hits first.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the slipway binary command.
fn slipway() -> Command {
    Command::cargo_bin("slipway").unwrap()
}

/// Create a temporary working directory.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// A complete site configuration for resolving the simulation package.
const SITE_CONFIG: &str = r#"
[toolchain]
family = "gnu"
version = "13.2.0"
cc = "gcc"
cxx = "g++"
fc = "gfortran"
mpicc = "mpicc"
mpifc = "mpif90"
stdcxx_libs = ["-lstdc++"]

[providers.mpi]
name = "openmpi"
version = "4.1.5"
prefix = "/opt/openmpi"

[providers.blas]
name = "openblas"
version = "0.3.27"
prefix = "/opt/openblas"
link_flags = "-L/opt/openblas/lib -lopenblas"

[providers.lapack]
name = "openblas"
version = "0.3.27"
prefix = "/opt/openblas"
link_flags = "-L/opt/openblas/lib -lopenblas"

[providers.fftw-api]
name = "fftw"
version = "3.3.10"
prefix = "/opt/fftw"
include_flags = "-I/opt/fftw/include"
link_flags = "-L/opt/fftw/lib -lfftw3"

[providers.scalapack]
name = "netlib-scalapack"
version = "2.2.0"
prefix = "/opt/scalapack"
link_flags = "-L/opt/scalapack/lib -lscalapack"
"#;

fn configured_dir() -> TempDir {
    let tmp = temp_dir();
    fs::write(tmp.path().join("slipway.toml"), SITE_CONFIG).unwrap();
    tmp
}

// ============================================================================
// slipway list / info
// ============================================================================

#[test]
fn test_list_shows_builtin_recipes() {
    slipway()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("vasp"))
        .stdout(predicate::str::contains("llamacpp"))
        .stdout(predicate::str::contains("ollama"));
}

#[test]
fn test_info_shows_features_and_versions() {
    slipway()
        .args(["info", "vasp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6.5.1"))
        .stdout(predicate::str::contains("openmp"))
        .stdout(predicate::str::contains("cuda_arch"))
        .stdout(predicate::str::contains("gnu, nvhpc, aocc, fujitsu"));
}

#[test]
fn test_info_unknown_recipe_suggests() {
    slipway()
        .args(["info", "llama"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown recipe"))
        .stderr(predicate::str::contains("llamacpp"));
}

// ============================================================================
// slipway resolve
// ============================================================================

#[test]
fn test_resolve_without_config_fails() {
    let tmp = temp_dir();

    slipway()
        .args(["resolve", "vasp@6.5.1"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no [toolchain] configured"));
}

#[test]
fn test_resolve_minimal_vasp_plan() {
    let tmp = configured_dir();

    let output = slipway()
        .args(["resolve", "vasp@6.5.1 %gnu", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(plan["template"], "arch/makefile.include.gnu");

    let defines: Vec<String> = plan["defines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap().to_string())
        .collect();
    assert!(defines.contains(&"-DMPI".to_string()));
    assert!(defines.contains(&"-Duse_shmem".to_string()));
    assert!(!defines.contains(&"-DUSENCCL".to_string()));
}

#[test]
fn test_resolve_human_readable_output() {
    let tmp = configured_dir();

    slipway()
        .args(["resolve", "vasp +openmp"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("arch/makefile.include.gnu_omp"))
        .stdout(predicate::str::contains("-D_OPENMP"))
        .stdout(predicate::str::contains("substitutions:"));
}

#[test]
fn test_resolve_conflict_is_reported() {
    let tmp = configured_dir();

    slipway()
        .args(["resolve", "vasp +cuda cuda_arch=80 %gnu"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cuda requires vendor compiler"));
}

#[test]
fn test_resolve_unknown_feature_is_reported() {
    let tmp = configured_dir();

    slipway()
        .args(["resolve", "vasp +mkl"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown feature `mkl`"))
        .stderr(predicate::str::contains("known features"));
}

#[test]
fn test_resolve_family_mismatch_with_toolchain() {
    let tmp = configured_dir();

    slipway()
        .args(["resolve", "vasp %nvhpc"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configured toolchain is `gnu`"));
}

#[test]
fn test_resolve_missing_provider_is_reported() {
    let tmp = configured_dir();

    // hdf5 needs a provider the site config does not declare.
    slipway()
        .args(["resolve", "vasp +hdf5"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no provider supplied for `hdf5`"));
}

#[test]
fn test_resolve_llamacpp_defaults() {
    let tmp = configured_dir();

    let output = slipway()
        .args(["resolve", "llamacpp", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(plan["template"].is_null());

    let args: Vec<String> = plan["configure_args"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a.as_str().unwrap().to_string())
        .collect();
    assert!(args.contains(&"-DGGML_CUDA=OFF".to_string()));
}

#[test]
fn test_resolve_is_deterministic_across_invocations() {
    let tmp = configured_dir();

    let run = || {
        slipway()
            .args(["resolve", "vasp@6.5.1 +openmp +hdf5", "--json"])
            .current_dir(tmp.path())
            .output()
            .unwrap()
    };

    // hdf5 needs one extra provider on top of the base site config.
    fs::write(
        tmp.path().join("slipway.toml"),
        format!(
            "{}\n[providers.hdf5]\nname = \"hdf5\"\nversion = \"1.14.3\"\nprefix = \"/opt/hdf5\"\nlink_flags = \"-L/opt/hdf5/lib -lhdf5_fortran\"\n",
            SITE_CONFIG
        ),
    )
    .unwrap();

    let a = run();
    let b = run();
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

// ============================================================================
// slipway env / completions
// ============================================================================

#[test]
fn test_env_prints_exports_and_warns_when_missing() {
    let tmp = configured_dir();

    slipway()
        .args(["env", "ollama@0.12.10"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("export PATH="))
        .stderr(predicate::str::contains("not installed yet"));
}

#[test]
fn test_completions_bash() {
    slipway()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slipway"));
}
