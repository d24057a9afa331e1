//! `slipway resolve` command

use anyhow::Result;

use slipway::core::plan::EnvAction;
use slipway::util::config::Config;
use slipway::{GlobalContext, RecipeRegistry, SpecRequest};

use crate::cli::ResolveArgs;
use crate::commands::{find_recipe, resolve_or_report, target_spec};

pub fn execute(args: ResolveArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = Config::load(&ctx)?;

    let request: SpecRequest = args.spec.parse()?;
    let registry = RecipeRegistry::builtin();
    let recipe = find_recipe(&registry, &request.name)?;

    let spec = target_spec(&request, recipe, &config)?;
    let plan = resolve_or_report(recipe, &spec, color)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "# Build plan for `{}@{}` ({} {})",
        spec.name, spec.version, spec.toolchain.family, spec.toolchain.version
    );

    if let Some(template) = &plan.template {
        println!("template: {}", template);
    }

    print_section("defines", &plan.defines);
    print_section("cflags", &plan.cflags);
    print_section("cxxflags", &plan.cxxflags);
    print_section("fflags", &plan.fflags);
    print_section("includes", &plan.includes);
    print_section("ldflags", &plan.ldflags);
    print_section("configure args", &plan.configure_args);

    if !plan.substitutions.is_empty() {
        println!("substitutions:");
        for sub in &plan.substitutions {
            if sub.replacement.is_empty() {
                println!("  {}  (cleared)", sub.pattern);
            } else {
                println!("  {}  ->  {}", sub.pattern, sub.replacement);
            }
        }
    }

    if !plan.env.is_empty() {
        println!("environment:");
        for (phase, actions) in [("build", &plan.env.build), ("run", &plan.env.run)] {
            for action in actions {
                match action {
                    EnvAction::Set { name, value } => {
                        println!("  [{}] {}={}", phase, name, value)
                    }
                    EnvAction::PathPrepend { name, value } => {
                        println!("  [{}] {}={}:...", phase, name, value)
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}:", title);
    for item in items {
        println!("  {}", item);
    }
}
