//! `slipway env` command
//!
//! Prints shell exports for a spec's install prefix: PATH and library
//! search paths derived from the prefix layout, plus the run-time
//! actions the resolver recorded in the plan's environment overlay.

use anyhow::Result;

use slipway::builder;
use slipway::core::plan::EnvAction;
use slipway::util::config::Config;
use slipway::util::diagnostic::{emit, Diagnostic};
use slipway::{GlobalContext, RecipeRegistry, SpecRequest};

use crate::cli::EnvArgs;
use crate::commands::{find_recipe, resolve_or_report, target_spec};

pub fn execute(args: EnvArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = Config::load(&ctx)?;

    let request: SpecRequest = args.spec.parse()?;
    let registry = RecipeRegistry::builtin();
    let recipe = find_recipe(&registry, &request.name)?;

    let spec = target_spec(&request, recipe, &config)?;
    let plan = resolve_or_report(recipe, &spec, color)?;

    let prefix = builder::install_prefix(&spec, &config, &ctx);
    if !prefix.exists() {
        emit(
            &Diagnostic::warning(format!("{} is not installed yet", args.spec))
                .with_suggestion(format!("Run `slipway install '{}'` first", args.spec)),
            color,
        );
    }

    let bin = prefix.join("bin");
    println!("export PATH={}:$PATH", bin.display());

    let lib = prefix.join("lib");
    if lib.exists() {
        println!("export LD_LIBRARY_PATH={}:$LD_LIBRARY_PATH", lib.display());
    }

    for action in &plan.env.run {
        match action {
            EnvAction::Set { name, value } => println!("export {}={}", name, value),
            EnvAction::PathPrepend { name, value } => {
                println!("export {}={}:${}", name, value, name)
            }
        }
    }

    Ok(())
}
