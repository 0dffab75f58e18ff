use std::fs;
use std::path::Path;

use anyhow::Context;
use logweave_engine::{MergeConfig, ScanMode};

use crate::cli::MergeArgs;

/// Parse a [`MergeConfig`] from TOML. Missing keys keep their defaults.
pub fn parse_config(text: &str) -> anyhow::Result<MergeConfig> {
    Ok(toml::from_str(text)?)
}

pub fn load_config(path: &Path) -> anyhow::Result<MergeConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Build the effective config: file values (if any), then CLI overrides.
pub fn resolve(args: &MergeArgs) -> anyhow::Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => MergeConfig::default(),
    };
    if args.fast {
        config.scan_mode = ScanMode::Fast;
    }
    if args.precise {
        config.scan_mode = ScanMode::Precise;
    }
    if let Some(framing) = args.framing {
        config.framing = framing.into();
    }
    if let Some(units) = args.progress_units {
        config.progress_units = units;
    }
    Ok(config)
}
