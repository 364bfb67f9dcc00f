use knob_core::{SettingsListing, SettingsRecord};
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaKind};
use crate::output::output;

/// Handle `knob schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.kind {
        SchemaKind::Record => schema_for!(SettingsRecord),
        SchemaKind::Listing => schema_for!(SettingsListing),
    };
    output(&schema, flags.format)
}
