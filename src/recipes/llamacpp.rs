//! llama.cpp - GPU inference engine, CMake recipe.
//!
//! Configuration is a handful of CMake cache entries derived from the
//! variant set; there is no template to edit.

use crate::core::family::CompilerFamily;
use crate::core::plan::BuildPlan;
use crate::core::provider::Virtual;
use crate::core::recipe::{BuildSystem, GitReference, Recipe, Release};
use crate::core::spec::TargetSpec;
use crate::core::variant::{VariantDef, VariantSet};
use crate::resolver::errors::ResolveError;

/// LLM inference in plain C/C++.
pub struct LlamaCpp;

const SUPPORTED_FAMILIES: &[CompilerFamily] = &[CompilerFamily::Gnu, CompilerFamily::Aocc];

/// Architectures built when `+cuda` is requested without an explicit
/// `cuda_arch` list.
const DEFAULT_CUDA_ARCHS: &[&str] = &["70", "75", "86", "90"];

impl Recipe for LlamaCpp {
    fn name(&self) -> &'static str {
        "llamacpp"
    }

    fn summary(&self) -> &'static str {
        "LLM inference engine in plain C/C++"
    }

    fn homepage(&self) -> &'static str {
        "https://github.com/ggml-org/llama.cpp"
    }

    fn build_system(&self) -> BuildSystem {
        BuildSystem::CMake
    }

    fn releases(&self) -> Vec<Release> {
        vec![
            Release::git(
                "b6276",
                "https://github.com/ggml-org/llama.cpp.git",
                GitReference::Tag("b6276".to_string()),
            ),
            Release::git(
                "latest",
                "https://github.com/ggml-org/llama.cpp.git",
                GitReference::Branch("master".to_string()),
            ),
        ]
    }

    fn variants(&self) -> Vec<VariantDef> {
        vec![
            VariantDef::boolean("cuda", false, "Enable CUDA backends"),
            VariantDef::list("cuda_arch", "CUDA compute capabilities, e.g. cuda_arch=86,90"),
        ]
    }

    fn supported_families(&self) -> &'static [CompilerFamily] {
        SUPPORTED_FAMILIES
    }

    fn required_virtuals(&self, variants: &VariantSet) -> Vec<Virtual> {
        if variants.enabled("cuda") {
            vec![Virtual::Cuda]
        } else {
            Vec::new()
        }
    }

    fn assemble(&self, spec: &TargetSpec) -> Result<BuildPlan, ResolveError> {
        let cuda = spec.variants.enabled("cuda");

        let mut configure_args = vec![
            "-DCMAKE_BUILD_TYPE=Release".to_string(),
            format!("-DGGML_CUDA={}", if cuda { "ON" } else { "OFF" }),
        ];

        if cuda {
            let requested = spec.variants.list("cuda_arch");
            let archs: Vec<&str> = if requested.is_empty() {
                DEFAULT_CUDA_ARCHS.to_vec()
            } else {
                requested.iter().map(String::as_str).collect()
            };
            configure_args.push(format!("-DCMAKE_CUDA_ARCHITECTURES={}", archs.join(";")));
        }

        Ok(BuildPlan {
            configure_args,
            ..BuildPlan::default()
        })
    }
}
