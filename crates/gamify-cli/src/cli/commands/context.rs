use super::super::args::{GlobalArgs, OutputFormat};
use gamify_core::config::GamifyConfig;
use gamify_core::Engine;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything a command needs once global flags are resolved.
pub(crate) struct CommandContext {
    pub engine: Engine,
    pub tenant: String,
    pub format: OutputFormat,
    pub database: PathBuf,
}

impl CommandContext {
    pub(crate) fn load(global: &GlobalArgs) -> anyhow::Result<Self> {
        let cfg = resolve_config(global)?;
        ensure_parent_dir(&cfg.database)?;
        tracing::debug!(
            config = %global.config.display(),
            database = %cfg.database.display(),
            cache = cfg.cache.enabled,
            "opening engine"
        );
        let engine = Engine::from_config(&cfg)?;
        Ok(Self {
            engine,
            tenant: global.tenant.clone(),
            format: global.format,
            database: cfg.database,
        })
    }

    /// Print `value` as pretty JSON or as the rendered text line(s).
    pub(crate) fn emit<T: Serialize>(
        &self,
        value: &T,
        text: impl FnOnce(&T) -> String,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => println!("{}", text(value)),
        }
        Ok(())
    }
}

pub(crate) fn resolve_config(global: &GlobalArgs) -> anyhow::Result<GamifyConfig> {
    let mut cfg = GamifyConfig::load_or_default(&global.config)?;
    if let Some(db) = &global.db {
        cfg.database = db.clone();
    }
    Ok(cfg)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
