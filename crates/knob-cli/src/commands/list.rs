use knob_service::SettingsService;

use crate::cli::GlobalFlags;
use crate::commands::with_status;
use crate::output::output;

/// Handle `knob list`.
pub fn handle(service: &SettingsService, flags: &GlobalFlags) -> anyhow::Result<()> {
    let listing = service
        .list()
        .map_err(|error| with_status("GET settings/", error))?;
    output(&listing, flags.format)
}
