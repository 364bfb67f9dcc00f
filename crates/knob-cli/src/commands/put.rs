use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use knob_service::SettingsService;
use serde::Serialize;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PutArgs;
use crate::commands::with_status;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PutResponse<'a> {
    id: &'a str,
    last_modified: DateTime<Utc>,
}

/// Handle `knob put`.
pub fn handle(args: &PutArgs, service: &SettingsService, flags: &GlobalFlags) -> anyhow::Result<()> {
    let raw = match (&args.raw, &args.file) {
        (Some(raw), _) => raw.clone(),
        (None, Some(path)) => read_source(path)?,
        (None, None) => anyhow::bail!("one of --raw or --file is required"),
    };

    let body = envelope(&raw)?;
    let last_modified = service
        .put(&args.id, &body)
        .map_err(|error| with_status(&format!("PUT settings/{}", args.id), error))?;

    if flags.quiet {
        return Ok(());
    }
    output(
        &PutResponse {
            id: &args.id,
            last_modified,
        },
        flags.format,
    )
}

/// Wrap settings text in the `{"raw": ...}` write envelope.
fn envelope(raw: &str) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec(&json!({ "raw": raw })).context("failed to encode settings payload")
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read settings from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))
}
