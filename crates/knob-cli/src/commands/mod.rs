use knob_service::SettingsService;

use crate::cli::{Commands, GlobalFlags};

pub mod get;
pub mod list;
pub mod put;
pub mod schema;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(
    command: &Commands,
    service: &SettingsService,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Get(args) => get::handle(args, service, flags),
        Commands::List => list::handle(service, flags),
        Commands::Put(args) => put::handle(args, service, flags),
        Commands::Schema(_) => unreachable!("schema is pre-dispatched in main"),
    }
}

/// Attach the HTTP-equivalent status to a service failure.
pub fn with_status(operation: &str, error: knob_service::ServiceError) -> anyhow::Error {
    let status = error.status_code();
    anyhow::Error::new(error).context(format!("{operation} failed ({status})"))
}
