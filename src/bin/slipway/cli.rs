//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Slipway - a recipe-driven build-configuration engine for scientific software
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available recipes
    List,

    /// Show a recipe's releases, features, and supported compilers
    Info(InfoArgs),

    /// Resolve a spec and print its build plan
    Resolve(ResolveArgs),

    /// Resolve, build, and install a spec
    Install(InstallArgs),

    /// Print shell exports for a spec's install prefix
    Env(EnvArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InfoArgs {
    /// Recipe name
    pub recipe: String,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Build spec, e.g. 'vasp@6.5.1 +openmp %gnu'
    pub spec: String,

    /// Emit the build plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Build spec, e.g. 'vasp@6.5.1 +openmp %gnu'
    pub spec: String,

    /// Number of parallel build jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep the stage directory after the build
    #[arg(long)]
    pub keep_stage: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Build spec, e.g. 'vasp@6.5.1 +openmp %gnu'
    pub spec: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
