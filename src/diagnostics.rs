//! Stderr diagnostics: warnings and `--debug` stage dumps.

use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fmt::Display;

pub fn warn(msg: impl Display) {
    eprintln!("WARN: {}", msg);
}

/// Pretty-print an intermediate pipeline value as JSON when `enabled`.
pub fn dump_stage<T: Serialize>(enabled: bool, stage: &str, value: &T) -> Result<()> {
    if !enabled {
        return Ok(());
    }
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {} for debug output", stage))?;
    eprintln!("DEBUG {}:\n{}", stage, json);
    Ok(())
}
