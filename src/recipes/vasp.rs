//! VASP - first-principles simulation package, makefile-template recipe.
//!
//! VASP ships a set of `arch/makefile.include.*` templates; configuring
//! a build means picking the template for the compiler family and
//! rewriting its variable assignments with the flags for the requested
//! variant combination. This recipe reproduces that as a pure plan:
//! exactly one family branch contributes the template and its baseline,
//! feature rules append in a fixed order, and the final substitutions
//! are derived from the finished flag lists.

use crate::core::family::CompilerFamily;
use crate::core::plan::{BuildPlan, EnvironmentOverlay, Substitution};
use crate::core::provider::Virtual;
use crate::core::recipe::{require_provider, BuildSystem, Constraint, Recipe, Release};
use crate::core::spec::TargetSpec;
use crate::core::variant::{VariantDef, VariantSet};
use crate::resolver::errors::ResolveError;

/// The Vienna Ab initio Simulation Package.
pub struct Vasp;

const SUPPORTED_FAMILIES: &[CompilerFamily] = &[
    CompilerFamily::Gnu,
    CompilerFamily::Nvhpc,
    CompilerFamily::Aocc,
    CompilerFamily::Fujitsu,
];

impl Recipe for Vasp {
    fn name(&self) -> &'static str {
        "vasp"
    }

    fn summary(&self) -> &'static str {
        "Atomic-scale materials modelling from first principles"
    }

    fn homepage(&self) -> &'static str {
        "https://vasp.at"
    }

    fn build_system(&self) -> BuildSystem {
        BuildSystem::Makefile
    }

    fn releases(&self) -> Vec<Release> {
        vec![
            Release::archive(
                "6.5.1",
                "file://./vasp.6.5.1.tgz",
                "a53fd9dd2a66472a4aa30074dbda44634fc663ea2628377fc01d870e37136f61",
            ),
            Release::archive(
                "6.5.0",
                "file://./vasp.6.5.0.tgz",
                "7836f0fd2387a6768be578f1177e795dc625f36f19015e31cab0e81154a24196",
            ),
            Release::archive(
                "6.4.3",
                "file://./vasp.6.4.3.tgz",
                "fe30e773f2a3e909b5e0baa9654032dfbdeff7ec157bc348cee7681a7b6c24f4",
            ),
            Release::archive(
                "6.3.2",
                "file://./vasp.6.3.2.tgz",
                "f7595221b0f9236a324ea8afe170637a578cdd5a837cc7679e7f7812f6edf25a",
            ),
            Release::archive(
                "6.3.0",
                "file://./vasp.6.3.0.tgz",
                "adcf83bdfd98061016baae31616b54329563aa2739573f069dd9df19c2071ad3",
            ),
        ]
    }

    fn variants(&self) -> Vec<VariantDef> {
        vec![
            VariantDef::boolean("openmp", false, "Enable the OpenMP build"),
            VariantDef::boolean("cuda", false, "Enable the OpenACC port for NVIDIA GPUs"),
            VariantDef::boolean("fftlib", true, "Build the bundled FFT plan cache").when("openmp"),
            VariantDef::boolean("shmem", true, "Use shared-memory communicators"),
            VariantDef::boolean("hdf5", false, "Enable HDF5 output support"),
            VariantDef::list("cuda_arch", "CUDA compute capabilities, e.g. cuda_arch=70,80"),
        ]
    }

    fn supported_families(&self) -> &'static [CompilerFamily] {
        SUPPORTED_FAMILIES
    }

    fn constraints(&self) -> Vec<Constraint> {
        vec![
            Constraint::FamilyMinimumVersion {
                family: CompilerFamily::Gnu,
                minimum: 9,
                requirement: "a Fortran front end new enough for the sources",
            },
            Constraint::FeatureNeedsFamily {
                feature: "cuda",
                family: CompilerFamily::Nvhpc,
                requirement: "vendor compiler",
            },
            Constraint::FeatureNeedsList {
                feature: "cuda",
                variant: "cuda_arch",
                requirement: "at least one GPU architecture",
            },
            Constraint::ProviderNeedsFamily {
                slot: Virtual::Mpi,
                provider: "nvhpc",
                family: CompilerFamily::Nvhpc,
                requirement: "the matching vendor compiler",
            },
            Constraint::FamilyMinimumRelease {
                family: CompilerFamily::Fujitsu,
                minimum: (6, 4, 3),
                requirement: "the A64FX template",
            },
        ]
    }

    fn required_virtuals(&self, variants: &VariantSet) -> Vec<Virtual> {
        let mut required = vec![
            Virtual::Mpi,
            Virtual::Blas,
            Virtual::Lapack,
            Virtual::FftwApi,
            Virtual::Scalapack,
        ];
        if variants.enabled("cuda") {
            required.push(Virtual::Nccl);
            required.push(Virtual::Cuda);
        }
        if variants.enabled("hdf5") {
            required.push(Virtual::Hdf5);
        }
        required
    }

    fn make_args(&self) -> Vec<String> {
        vec!["DEPS=1".to_string(), "all".to_string()]
    }

    fn install_trees(&self) -> &'static [&'static str] {
        &["bin"]
    }

    fn manual_download(&self) -> bool {
        true
    }

    fn assemble(&self, spec: &TargetSpec) -> Result<BuildPlan, ResolveError> {
        let tc = &spec.toolchain;
        let v = &spec.variants;
        let openmp = v.enabled("openmp");

        let mut defines: Vec<String> = [
            "-DMPI",
            "-DMPI_BLOCK=8000",
            "-Duse_collective",
            "-DCACHE_SIZE=4000",
            "-Davoidalloc",
            "-Duse_bse_te",
            "-Dtbdyn",
            "-Dfock_dblbuf",
            "-Dvasp6",
        ]
        .map(String::from)
        .to_vec();

        let mut objects_lib = vec!["linpack_double.o".to_string()];
        let mut llibs = tc.stdcxx_libs.clone();
        let cflags = vec!["-fPIC".to_string(), "-DAAD_".to_string()];
        let mut fflags = vec!["-w".to_string()];
        let mut cxxflags: Vec<String> = Vec::new();

        let fftw = require_provider(spec, Virtual::FftwApi, "the FFT baseline")?;
        let mut incs = vec![fftw.include_flags.clone()];

        let blas = require_provider(spec, Virtual::Blas, "the linear-algebra baseline")?;
        let lapack = require_provider(spec, Virtual::Lapack, "the linear-algebra baseline")?;
        llibs.push(blas.link_flags.clone());
        llibs.push(lapack.link_flags.clone());

        let mut fc = vec![tc.mpifc.clone()];
        let mut fcl = vec![tc.mpifc.clone()];

        let omp_flag = tc.family.openmp_flag();

        if v.enabled("shmem") {
            defines.push("-Duse_shmem".to_string());
            objects_lib.push("getshmem.o".to_string());
        }

        // Exactly one family branch runs; each owns its template stem
        // and family-specific substitutions.
        let mut subs: Vec<Substitution> = Vec::new();
        let mut env = EnvironmentOverlay::default();

        let template = match tc.family {
            CompilerFamily::Gnu => {
                let stem = if openmp { "gnu_omp" } else { "gnu" };
                format!("arch/makefile.include.{}", stem)
            }

            CompilerFamily::Nvhpc => {
                let sdk = tc.prefix.as_ref().ok_or_else(|| {
                    ResolveError::MissingPrerequisite {
                        what: "toolchain install prefix".to_string(),
                        needed_by: "the nvhpc qd-emulation paths".to_string(),
                    }
                })?;

                let nvroot = sdk.join(format!("Linux_{}", tc.target_arch));
                let qd_root = nvroot
                    .join(format!("{}.{}", tc.version.major, tc.version.minor))
                    .join("compilers")
                    .join("extras")
                    .join("qd");

                defines.push("-DHOST=\\\"LinuxNV\\\"".to_string());
                defines.push("-Dqd_emulate".to_string());
                fflags.extend(["-Mnoupcase", "-Mbackslash", "-Mlarge_arrays"].map(String::from));
                incs.push(format!("-I{}", qd_root.join("include").join("qd").display()));
                llibs.push(format!("-L{}", qd_root.join("lib").display()));
                llibs.push("-lqdmod".to_string());
                llibs.push("-lqd".to_string());

                subs.push(Substitution::new(
                    r"^QD[ \t]*\??=.*$",
                    format!("QD = {}", qd_root.display()),
                ));
                subs.push(Substitution::new(
                    r"^NVROOT[ \t]*=.*$",
                    format!("NVROOT = {}", nvroot.display()),
                ));

                let mut stem = String::from("nvhpc");
                if openmp {
                    stem.push_str("_omp");
                }
                if v.enabled("cuda") {
                    stem.push_str("_acc");
                }
                format!("arch/makefile.include.{}", stem)
            }

            CompilerFamily::Aocc => {
                defines.push("-DHOST=\\\"LinuxAMD\\\"".to_string());
                defines.push("-Dshmem_bcast_buffer".to_string());
                defines.push("-DNGZhalf".to_string());
                fflags.extend(
                    ["-fno-fortran-main", "-Mbackslash", "-ffunc-args-alias"].map(String::from),
                );

                if fftw.name == "amdfftw" && fftw.version.major >= 4 {
                    defines.push("-Dfftw_cache_plans".to_string());
                    defines.push("-Duse_fftw_plan_effort".to_string());
                }

                // Older releases predate the aocc templates and reuse
                // the gnu ones.
                let stem = if spec.version.at_least(6, 3, 2) {
                    if openmp { "aocc_ompi_aocl_omp" } else { "aocc_ompi_aocl" }
                } else if spec.version.is("6.3.0") {
                    if openmp { "gnu_ompi_aocl_omp" } else { "gnu_ompi_aocl" }
                } else if openmp {
                    "gnu_omp"
                } else {
                    "gnu"
                };

                subs.push(Substitution::new(
                    r"^CC_LIB[ ]{0,}=.*$",
                    format!("CC_LIB={}", tc.cc),
                ));
                if spec.version.in_range((6, 0, 0), (6, 3, 0)) {
                    subs.push(Substitution::literal("gcc", format!("{} -Mfree", tc.fc)));
                    subs.push(Substitution::literal(
                        "-fallow-argument-mismatch",
                        " -fno-fortran-main",
                    ));
                }
                format!("arch/makefile.include.{}", stem)
            }

            CompilerFamily::Fujitsu => {
                fc.push("simd_nouse_multiple_structures".to_string());
                fc.push("-X03".to_string());
                fcl.push("simd_nouse_multiple_structures".to_string());
                defines.push("-DHOST=\\\"FJ-A64FX\\\"".to_string());
                fflags.push("-Koptmsg=2".to_string());
                llibs.push("-SSL2BLAMP".to_string());
                llibs.push("-SCALAPACK".to_string());

                let stem = if openmp { "fujitsu_a64fx_omp" } else { "fujitsu_a64fx" };
                format!("arch/makefile.include.{}", stem)
            }
        };

        if openmp {
            defines.push("-Dsysv".to_string());
            defines.push("-D_OPENMP".to_string());
            llibs.push("-ldl".to_string());
            llibs.push(fftw.link_flags.clone());
            fc.push(omp_flag.to_string());
            fcl.push(omp_flag.to_string());
        } else {
            llibs.push(fftw.link_flags.clone());
        }

        let scalapack = require_provider(spec, Virtual::Scalapack, "the scalapack baseline")?;
        defines.push("-DscaLAPACK".to_string());
        if tc.family == CompilerFamily::Nvhpc {
            llibs.push("-Mscalapack".to_string());
        } else {
            llibs.push(scalapack.link_flags.clone());
        }

        if v.enabled("cuda") {
            if spec.version.at_least(6, 5, 0) {
                defines.extend(["-DACC_OFFLOAD", "-DNVCUDA", "-DUSENCCL"].map(String::from));
            } else {
                defines.extend(["-D_OPENACC", "-DUSENCCL"].map(String::from));
            }
            llibs.push("-cudalib=cublas,cusolver,cufft,nccl".to_string());
            llibs.push("-cuda".to_string());
            fc.push("-acc".to_string());
            fcl.push("-acc".to_string());

            let cuda = require_provider(spec, Virtual::Cuda, "the openacc port")?;
            let mut gpu_parts = vec![
                format!("cuda{}.{}", cuda.version.major, cuda.version.minor),
                "rdc".to_string(),
            ];
            for arch in v.list("cuda_arch") {
                gpu_parts.push(format!("cc{}", arch));
            }
            let gpu_flag = format!("-gpu={}", gpu_parts.join(","));
            fc.push(gpu_flag.clone());
            fcl.push(gpu_flag);
            fcl.extend(tc.stdcxx_libs.iter().cloned());

            let mut cc_line = vec![tc.mpicc.clone(), "-acc".to_string()];
            if openmp {
                cc_line.push(omp_flag.to_string());
            }
            subs.push(Substitution::new(
                r"^CC[ \t]*=.*$",
                format!("CC = {}", cc_line.join(" ")),
            ));

            env.set_build("NVHPC_CUDA_HOME", cuda.prefix.display().to_string());
        }

        if v.enabled("hdf5") {
            let hdf5 = require_provider(spec, Virtual::Hdf5, "HDF5 output support")?;
            defines.push("-DVASP_HDF5".to_string());
            llibs.push(hdf5.link_flags.clone());
            incs.push(hdf5.include_flags.clone());
        }

        if tc.family == CompilerFamily::Gnu && tc.version.major >= 10 {
            fflags.push("-fallow-argument-mismatch".to_string());
        }

        if v.enabled("fftlib") {
            cxxflags.push(omp_flag.to_string());
            cxxflags.push("-DFFTLIB_THREADSAFE".to_string());

            subs.push(Substitution::new(
                r"^#FCL[ ]{0,}=fftlib\.o",
                "FCL += fftlib/fftlib.o",
            ));
            subs.push(Substitution::new(
                r"^#CXX_FFTLIB.*$",
                format!(
                    "CXX_FFTLIB = {} {} {}",
                    tc.cxx,
                    cxxflags.join(" "),
                    tc.stdcxx_libs.join(" ")
                ),
            ));
            subs.push(Substitution::new(
                r"^#INCS_FFTLIB.*$",
                format!("INCS_FFTLIB = -I./include {}", fftw.include_flags),
            ));
            subs.push(Substitution::new(r"#LIBS[ \t]*\+=.*$", "LIBS = fftlib"));

            llibs.push("-ldl".to_string());
            fcl.push("fftlib/fftlib.o".to_string());
        }

        // Every flag list is final from here; the remaining
        // substitutions rewrite the template's variable assignments from
        // those lists.
        subs.push(Substitution::new(
            r"^[ \t]+(-D[a-zA-Z0-9_=]+[ ]*)+[ ]*\\*$",
            "",
        ));
        subs.push(Substitution::new(
            r"^FFLAGS[ \t]*=.*$",
            format!("FFLAGS = {}", fflags.join(" ")),
        ));
        subs.push(Substitution::new(r"^FFLAGS[ \t]*\+=.*$", ""));
        subs.push(Substitution::new(
            r"^CPP_OPTIONS[ \t]*=.*$",
            format!("CPP_OPTIONS = {}", defines.join(" ")),
        ));
        subs.push(Substitution::new(
            r"^INCS[ \t]*\+?=.*$",
            format!("INCS = {}", incs.join(" ")),
        ));
        subs.push(Substitution::new(
            r"^LLIBS[ \t]*\+?=.*$",
            format!("LLIBS = {}", llibs.join(" ")),
        ));
        subs.push(Substitution::new(r"^LLIBS[ \t]*\+=[ ]*-.*$", ""));
        subs.push(Substitution::new(
            r"^CFLAGS[ \t]*=.*$",
            format!("CFLAGS = {}", cflags.join(" ")),
        ));
        subs.push(Substitution::new(
            r"^OBJECTS_LIB[ \t]*=.*$",
            format!("OBJECTS_LIB = {}", objects_lib.join(" ")),
        ));
        subs.push(Substitution::new(
            r"^FC[ \t]*=.*$",
            format!("FC = {}", fc.join(" ")),
        ));
        subs.push(Substitution::new(
            r"^FCL[ \t]*=.*$",
            format!("FCL = {}", fcl.join(" ")),
        ));
        subs.push(Substitution::new(r"^VASP_TARGET_CPU[ ]{0,}\?=.*", ""));

        Ok(BuildPlan {
            template: Some(template),
            defines,
            cflags,
            cxxflags,
            fflags,
            ldflags: llibs,
            includes: incs,
            configure_args: Vec::new(),
            substitutions: subs,
            env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use crate::test_support::{
        aocc_toolchain, cuda_providers, fujitsu_toolchain, gnu_toolchain, nvhpc_toolchain,
        provider, vasp_spec,
    };
    use std::collections::BTreeSet;

    /// A spec with every boolean variant switched off.
    fn bare_spec(version: &str, toolchain: crate::core::spec::Toolchain) -> TargetSpec {
        let mut spec = vasp_spec(version, toolchain);
        for name in ["openmp", "cuda", "fftlib", "shmem", "hdf5"] {
            spec.variants.set_bool(name, false);
        }
        spec
    }

    #[test]
    fn test_gnu_minimal_plan_is_baseline_only() {
        let plan = resolve(&Vasp, &bare_spec("6.5.1", gnu_toolchain())).unwrap();

        assert_eq!(plan.template.as_deref(), Some("arch/makefile.include.gnu"));
        assert!(plan.has_define("-DMPI"));
        assert!(plan.has_define("-DscaLAPACK"));
        assert!(!plan.has_define("-DUSENCCL"));
        assert!(!plan.has_define("-Duse_shmem"));
        assert!(!plan.has_define("-D_OPENMP"));
        assert!(!plan.has_define("-DVASP_HDF5"));
        assert!(plan.configure_args.is_empty());
    }

    #[test]
    fn test_bare_plans_for_every_family_skip_feature_flags() {
        for toolchain in [
            gnu_toolchain(),
            nvhpc_toolchain(),
            aocc_toolchain(),
            fujitsu_toolchain(),
        ] {
            let plan = resolve(&Vasp, &bare_spec("6.5.1", toolchain)).unwrap();
            for feature_flag in ["-DUSENCCL", "-Duse_shmem", "-D_OPENMP", "-DVASP_HDF5"] {
                assert!(!plan.has_define(feature_flag), "stray {}", feature_flag);
            }
        }
    }

    #[test]
    fn test_defaults_enable_shmem() {
        // An empty variant request picks up the declared defaults.
        let plan = resolve(&Vasp, &vasp_spec("6.5.1", gnu_toolchain())).unwrap();
        assert!(plan.has_define("-Duse_shmem"));
        // fftlib defaults on but is gated on openmp, which defaults off.
        assert!(!plan.substitutions.iter().any(|s| s.replacement.contains("CXX_FFTLIB")));
    }

    #[test]
    fn test_openmp_selects_omp_template_and_flags() {
        let mut spec = vasp_spec("6.5.1", gnu_toolchain());
        spec.variants.set_bool("openmp", true);

        let plan = resolve(&Vasp, &spec).unwrap();
        assert_eq!(plan.template.as_deref(), Some("arch/makefile.include.gnu_omp"));
        assert!(plan.has_define("-D_OPENMP"));
        assert!(plan.ldflags.contains(&"-ldl".to_string()));

        // fftlib default kicks in once openmp is on.
        let fc_line = plan
            .substitutions
            .iter()
            .find(|s| s.pattern == r"^FCL[ \t]*=.*$")
            .unwrap();
        assert!(fc_line.replacement.contains("-fopenmp"));
        assert!(fc_line.replacement.contains("fftlib/fftlib.o"));
    }

    #[test]
    fn test_feature_plan_is_strict_superset() {
        let base = resolve(&Vasp, &bare_spec("6.5.1", gnu_toolchain())).unwrap();

        let mut with_hdf5 = bare_spec("6.5.1", gnu_toolchain());
        with_hdf5.variants.set_bool("hdf5", true);
        with_hdf5
            .providers
            .insert(Virtual::Hdf5, provider("hdf5", (1, 14, 3), "/opt/hdf5"));
        let plan = resolve(&Vasp, &with_hdf5).unwrap();

        let base_tokens: BTreeSet<&str> = base.tokens().collect();
        let hdf5_tokens: BTreeSet<&str> = plan.tokens().collect();
        assert!(hdf5_tokens.is_superset(&base_tokens));
        assert!(hdf5_tokens.len() > base_tokens.len());
        assert!(plan.has_define("-DVASP_HDF5"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut spec = vasp_spec("6.5.0", nvhpc_toolchain());
        spec.providers = cuda_providers();
        spec.variants.set_bool("cuda", true);
        spec.variants.set_bool("openmp", true);
        spec.variants
            .set_list("cuda_arch", vec!["70".into(), "80".into()]);

        let a = serde_json::to_string(&resolve(&Vasp, &spec).unwrap()).unwrap();
        let b = serde_json::to_string(&resolve(&Vasp, &spec).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cuda_on_gnu_is_a_conflict() {
        let mut spec = vasp_spec("6.5.1", gnu_toolchain());
        spec.providers = cuda_providers();
        spec.variants.set_bool("cuda", true);
        spec.variants.set_list("cuda_arch", vec!["70".into()]);

        let err = resolve(&Vasp, &spec).unwrap_err();
        assert!(matches!(err, ResolveError::Conflict { .. }));
        assert!(err.to_string().contains("cuda requires vendor compiler"));
    }

    #[test]
    fn test_cuda_without_arch_is_a_conflict() {
        let mut spec = vasp_spec("6.5.1", nvhpc_toolchain());
        spec.providers = cuda_providers();
        spec.variants.set_bool("cuda", true);

        let err = resolve(&Vasp, &spec).unwrap_err();
        assert!(err.to_string().contains("cuda requires at least one GPU architecture"));
    }

    #[test]
    fn test_nvhpc_cuda_plan() {
        let mut spec = vasp_spec("6.5.0", nvhpc_toolchain());
        spec.providers = cuda_providers();
        spec.variants.set_bool("cuda", true);
        spec.variants
            .set_list("cuda_arch", vec!["70".into(), "80".into()]);

        let plan = resolve(&Vasp, &spec).unwrap();

        assert_eq!(
            plan.template.as_deref(),
            Some("arch/makefile.include.nvhpc_acc")
        );
        assert!(plan.has_define("-DACC_OFFLOAD"));
        assert!(plan.has_define("-DUSENCCL"));
        assert!(plan.has_define("-Dqd_emulate"));

        let fc_sub = plan
            .substitutions
            .iter()
            .find(|s| s.pattern == r"^FC[ \t]*=.*$")
            .unwrap();
        assert!(fc_sub.replacement.contains("-acc"));
        assert!(fc_sub.replacement.contains("-gpu=cuda12.4,rdc,cc70,cc80"));

        let qd_sub = plan
            .substitutions
            .iter()
            .find(|s| s.pattern.starts_with("^QD"))
            .unwrap();
        assert!(qd_sub.replacement.contains("/opt/nvhpc/Linux_x86_64/24.3"));

        assert!(plan
            .env
            .build
            .iter()
            .any(|a| matches!(a, crate::core::plan::EnvAction::Set { name, value }
                if name == "NVHPC_CUDA_HOME" && value == "/opt/cuda")));
    }

    #[test]
    fn test_pre_650_cuda_uses_openacc_define() {
        let mut spec = vasp_spec("6.4.3", nvhpc_toolchain());
        spec.providers = cuda_providers();
        spec.variants.set_bool("cuda", true);
        spec.variants.set_list("cuda_arch", vec!["80".into()]);

        let plan = resolve(&Vasp, &spec).unwrap();
        assert!(plan.has_define("-D_OPENACC"));
        assert!(!plan.has_define("-DACC_OFFLOAD"));
    }

    #[test]
    fn test_aocc_template_depends_on_release() {
        let plan = resolve(&Vasp, &vasp_spec("6.5.1", aocc_toolchain())).unwrap();
        assert_eq!(
            plan.template.as_deref(),
            Some("arch/makefile.include.aocc_ompi_aocl")
        );

        let plan = resolve(&Vasp, &vasp_spec("6.3.0", aocc_toolchain())).unwrap();
        assert_eq!(
            plan.template.as_deref(),
            Some("arch/makefile.include.gnu_ompi_aocl")
        );
        // Old releases rewrite the gnu driver references in place.
        assert!(plan.substitutions.iter().any(|s| s.literal && s.pattern == "gcc"));
    }

    #[test]
    fn test_aocc_amdfftw_plan_defines() {
        let mut spec = vasp_spec("6.5.1", aocc_toolchain());
        spec.providers
            .insert(Virtual::FftwApi, provider("amdfftw", (4, 1, 0), "/opt/amdfftw"));

        let plan = resolve(&Vasp, &spec).unwrap();
        assert!(plan.has_define("-Dfftw_cache_plans"));
        assert!(plan.has_define("-Duse_fftw_plan_effort"));
    }

    #[test]
    fn test_fujitsu_needs_recent_release() {
        let err = resolve(&Vasp, &vasp_spec("6.3.2", fujitsu_toolchain())).unwrap_err();
        assert!(matches!(err, ResolveError::Conflict { .. }));

        let plan = resolve(&Vasp, &vasp_spec("6.4.3", fujitsu_toolchain())).unwrap();
        assert_eq!(
            plan.template.as_deref(),
            Some("arch/makefile.include.fujitsu_a64fx")
        );
        assert!(plan.ldflags.contains(&"-SSL2BLAMP".to_string()));
    }

    #[test]
    fn test_old_gnu_is_rejected() {
        let mut toolchain = gnu_toolchain();
        toolchain.version = semver::Version::new(8, 5, 0);

        let err = resolve(&Vasp, &vasp_spec("6.5.1", toolchain)).unwrap_err();
        assert!(matches!(err, ResolveError::Conflict { .. }));
    }

    #[test]
    fn test_gnu_ten_gets_argument_mismatch_flag() {
        let plan = resolve(&Vasp, &vasp_spec("6.5.1", gnu_toolchain())).unwrap();
        assert!(plan.fflags.contains(&"-fallow-argument-mismatch".to_string()));

        let mut old = gnu_toolchain();
        old.version = semver::Version::new(9, 5, 0);
        let plan = resolve(&Vasp, &vasp_spec("6.5.1", old)).unwrap();
        assert!(!plan.fflags.contains(&"-fallow-argument-mismatch".to_string()));
    }

    #[test]
    fn test_nvhpc_mpi_on_gnu_is_a_conflict() {
        let mut spec = vasp_spec("6.5.1", gnu_toolchain());
        spec.providers
            .insert(Virtual::Mpi, provider("nvhpc", (24, 3, 0), "/opt/nvhpc"));

        let err = resolve(&Vasp, &spec).unwrap_err();
        assert!(err.to_string().contains("mpi provider `nvhpc`"));
    }

    #[test]
    fn test_unknown_feature_fails() {
        let mut spec = vasp_spec("6.5.1", gnu_toolchain());
        spec.variants.set_bool("mkl", true);

        let err = resolve(&Vasp, &spec).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownFeature { .. }));
    }

    #[test]
    fn test_missing_scalapack_provider_fails() {
        let mut spec = vasp_spec("6.5.1", gnu_toolchain());
        spec.providers = crate::test_support::base_providers();
        // Rebuild the set without scalapack.
        let mut stripped = crate::core::provider::ProviderSet::new();
        for (slot, p) in spec.providers.iter() {
            if slot != Virtual::Scalapack {
                stripped.insert(slot, p.clone());
            }
        }
        spec.providers = stripped;

        let err = resolve(&Vasp, &spec).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingPrerequisite { what, .. } if what == "scalapack"
        ));
    }

    #[test]
    fn test_substitutions_follow_finalized_lists() {
        let plan = resolve(&Vasp, &vasp_spec("6.5.1", gnu_toolchain())).unwrap();

        let cpp = plan
            .substitutions
            .iter()
            .find(|s| s.pattern == r"^CPP_OPTIONS[ \t]*=.*$")
            .unwrap();
        assert_eq!(cpp.replacement, format!("CPP_OPTIONS = {}", plan.defines.join(" ")));

        let llibs = plan
            .substitutions
            .iter()
            .find(|s| s.pattern == r"^LLIBS[ \t]*\+?=.*$")
            .unwrap();
        assert_eq!(llibs.replacement, format!("LLIBS = {}", plan.ldflags.join(" ")));
    }
}
