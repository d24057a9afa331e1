//! `slipway install` command

use anyhow::Result;

use slipway::builder::{self, BuildOptions};
use slipway::util::config::Config;
use slipway::{GlobalContext, RecipeRegistry, SpecRequest};

use crate::cli::InstallArgs;
use crate::commands::{find_recipe, resolve_or_report, target_spec};

pub fn execute(args: InstallArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = Config::load(&ctx)?;

    let request: SpecRequest = args.spec.parse()?;
    let registry = RecipeRegistry::builtin();
    let recipe = find_recipe(&registry, &request.name)?;

    let spec = target_spec(&request, recipe, &config)?;
    let plan = resolve_or_report(recipe, &spec, color)?;

    let opts = BuildOptions {
        jobs: args.jobs,
        keep_stage: args.keep_stage,
    };

    let prefix = builder::install(recipe, &spec, &plan, &config, &ctx, &opts)?;

    println!("installed {}@{} to {}", spec.name, spec.version, prefix.display());
    println!("run `slipway env '{}'` for shell exports", args.spec);

    Ok(())
}
