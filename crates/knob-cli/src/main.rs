use anyhow::Context;
use clap::Parser;
use knob_config::KnobConfig;
use knob_service::SettingsService;

mod cli;
mod commands;
mod output;

fn main() {
    if let Err(error) = run() {
        eprintln!("knob error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();

    if let cli::Commands::Schema(args) = &cli.command {
        return commands::schema::handle(args, &flags);
    }

    let config = load_config(&flags)?;
    let service =
        SettingsService::from_config(&config).context("failed to initialize settings service")?;

    commands::dispatch(&cli.command, &service, &flags)
}

fn load_config(flags: &cli::GlobalFlags) -> anyhow::Result<KnobConfig> {
    match &flags.config {
        Some(path) => {
            let _ = dotenvy::dotenv();
            KnobConfig::load_from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => KnobConfig::load_with_dotenv().context("failed to load config"),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("KNOB_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
