//! Command scripts
//!
//! A script lists commands one flag line at a time, each followed by its
//! selector on the next line:
//!
//! ```text
//! # drop health checks, then tidy up
//! -ls
//! request.path==/health
//! --key_strip
//! headers.cookie
//! ```

use crate::edit::{CommandKind, CommandSpec};
use crate::error::{AnvilError, Result};
use anyhow::Context;
use std::path::Path;

/// Parse script text. `origin` names the script in error messages.
pub fn parse_script(text: &str, origin: &str) -> Result<Vec<CommandSpec>> {
    let mut specs = Vec::new();
    let mut pending: Option<CommandKind> = None;

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(kind) = pending.take() {
            specs.push(CommandSpec::new(kind, line));
            continue;
        }

        let name = line
            .strip_prefix("--")
            .or_else(|| line.strip_prefix('-'))
            .ok_or_else(|| AnvilError::UnexpectedScriptLine {
                file: origin.to_string(),
                line: number + 1,
                text: line.to_string(),
            })?;
        let kind = CommandKind::from_name(name)
            .ok_or_else(|| AnvilError::UnknownCommand(name.to_string()))?;
        pending = Some(kind);
    }

    if let Some(kind) = pending {
        return Err(AnvilError::MissingSelector {
            file: origin.to_string(),
            command: kind.name().to_string(),
        });
    }
    Ok(specs)
}

/// Read and parse a script file.
pub fn load_script<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<CommandSpec>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read command script: {}", path.display()))?;
    Ok(parse_script(&text, &path.display().to_string())?)
}
