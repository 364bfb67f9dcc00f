use knob_service::SettingsService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::GetArgs;
use crate::commands::with_status;
use crate::output::output;

/// Handle `knob get`.
pub fn handle(args: &GetArgs, service: &SettingsService, flags: &GlobalFlags) -> anyhow::Result<()> {
    let record = service
        .get(&args.id)
        .map_err(|error| with_status(&format!("GET settings/{}", args.id), error))?;
    output(&record, flags.format)
}
