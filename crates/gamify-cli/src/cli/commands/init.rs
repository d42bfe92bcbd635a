use super::super::args::{GlobalArgs, InitArgs};
use super::context::{resolve_config, CommandContext};
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use serde_json::json;

pub(crate) fn run(global: &GlobalArgs, args: InitArgs) -> anyhow::Result<i32> {
    if args.write_config {
        if global.config.exists() {
            eprintln!("config exists, leaving it alone: {}", global.config.display());
        } else {
            let cfg = resolve_config(global)?;
            super::context::ensure_parent_dir(&global.config)?;
            std::fs::write(&global.config, serde_yaml::to_string(&cfg)?)
                .with_context(|| format!("failed to write {}", global.config.display()))?;
            eprintln!("wrote config: {}", global.config.display());
        }
    }

    let ctx = CommandContext::load(global)?;
    let version = ctx.engine.store().schema_version()?;
    let summary = json!({
        "database": ctx.database.display().to_string(),
        "schema_version": version,
    });
    ctx.emit(&summary, |_| {
        format!(
            "initialized {} (schema v{})",
            ctx.database.display(),
            version.unwrap_or_default()
        )
    })?;
    Ok(SUCCESS)
}
