//! Test fixtures for slipway unit tests.
//!
//! Only compiled for tests. Provides canned toolchains and provider
//! sets so recipe tests construct specs in one line.

use semver::Version;

use crate::core::family::CompilerFamily;
use crate::core::provider::{Provider, ProviderSet, Virtual};
use crate::core::spec::{TargetSpec, Toolchain};
use crate::core::version::VersionId;

/// A GNU toolchain as a site would configure it.
pub fn gnu_toolchain() -> Toolchain {
    Toolchain {
        family: CompilerFamily::Gnu,
        version: Version::new(13, 2, 0),
        prefix: None,
        target_arch: "x86_64".to_string(),
        cc: "gcc".to_string(),
        cxx: "g++".to_string(),
        fc: "gfortran".to_string(),
        mpicc: "mpicc".to_string(),
        mpifc: "mpif90".to_string(),
        stdcxx_libs: vec!["-lstdc++".to_string()],
    }
}

/// An NVIDIA HPC SDK toolchain rooted at `/opt/nvhpc`.
pub fn nvhpc_toolchain() -> Toolchain {
    Toolchain {
        family: CompilerFamily::Nvhpc,
        version: Version::new(24, 3, 0),
        prefix: Some("/opt/nvhpc".into()),
        target_arch: "x86_64".to_string(),
        cc: "nvc".to_string(),
        cxx: "nvc++".to_string(),
        fc: "nvfortran".to_string(),
        mpicc: "mpicc".to_string(),
        mpifc: "mpif90".to_string(),
        stdcxx_libs: vec!["-lstdc++".to_string()],
    }
}

/// An AOCC toolchain.
pub fn aocc_toolchain() -> Toolchain {
    Toolchain {
        family: CompilerFamily::Aocc,
        version: Version::new(4, 2, 0),
        prefix: None,
        target_arch: "x86_64".to_string(),
        cc: "clang".to_string(),
        cxx: "clang++".to_string(),
        fc: "flang".to_string(),
        mpicc: "mpicc".to_string(),
        mpifc: "mpif90".to_string(),
        stdcxx_libs: vec!["-lstdc++".to_string()],
    }
}

/// A Fujitsu toolchain on A64FX.
pub fn fujitsu_toolchain() -> Toolchain {
    Toolchain {
        family: CompilerFamily::Fujitsu,
        version: Version::new(4, 10, 0),
        prefix: None,
        target_arch: "aarch64".to_string(),
        cc: "fcc".to_string(),
        cxx: "FCC".to_string(),
        fc: "frt".to_string(),
        mpicc: "mpifcc".to_string(),
        mpifc: "mpifrt".to_string(),
        stdcxx_libs: vec!["-lstdc++".to_string()],
    }
}

/// One provider with flag tokens derived from its prefix.
pub fn provider(name: &str, version: (u64, u64, u64), prefix: &str) -> Provider {
    Provider::new(name, Version::new(version.0, version.1, version.2), prefix)
        .with_include_flags(format!("-I{}/include", prefix))
        .with_link_flags(format!("-L{}/lib -l{}", prefix, name))
}

/// The provider set every simulation-package build needs.
pub fn base_providers() -> ProviderSet {
    ProviderSet::new()
        .with(Virtual::Mpi, provider("openmpi", (4, 1, 5), "/opt/openmpi"))
        .with(Virtual::Blas, provider("openblas", (0, 3, 27), "/opt/openblas"))
        .with(Virtual::Lapack, provider("openblas", (0, 3, 27), "/opt/openblas"))
        .with(Virtual::FftwApi, provider("fftw", (3, 3, 10), "/opt/fftw"))
        .with(
            Virtual::Scalapack,
            provider("netlib-scalapack", (2, 2, 0), "/opt/scalapack"),
        )
}

/// Base providers plus the GPU pair.
pub fn cuda_providers() -> ProviderSet {
    let mut providers = base_providers();
    providers.insert(Virtual::Cuda, provider("cuda", (12, 4, 0), "/opt/cuda"));
    providers.insert(Virtual::Nccl, provider("nccl", (2, 20, 5), "/opt/nccl"));
    providers
}

/// A simulation-package spec with the base providers attached.
pub fn vasp_spec(version: &str, toolchain: Toolchain) -> TargetSpec {
    TargetSpec {
        name: "vasp".to_string(),
        version: VersionId::new(version),
        variants: Default::default(),
        toolchain,
        providers: base_providers(),
    }
}
