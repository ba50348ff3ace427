// overlay-clock - paint the current time onto the desktop background

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use overlay_clock::{
    clock,
    config::{CliArgs, Config, Overrides},
    display::XftBackend,
    render::RenderLoop,
    signal, SystemClock,
};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Help, version and usage errors (exit 2) are handled by clap
    let cli = CliArgs::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting after fatal error");
            eprintln!("overlay-clock: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: CliArgs) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config file")?;
    config.apply(&Overrides::from_env().context("Invalid environment setting")?);
    config.apply(&cli.overrides());
    config.validate()?;

    tracing::info!(?config, "Configuration resolved");

    let locale = clock::locale_from_env();
    tracing::debug!(?locale, "Using time locale");
    let format = config.time_format()?.with_locale(locale);
    let stop = signal::install_stop_handlers().context("Failed to install signal handlers")?;

    let backend = XftBackend::open(&config.font, &config.color)
        .context("Failed to set up the display")?;

    let mut render = RenderLoop::new(
        backend,
        SystemClock,
        format,
        config.position,
        config.update_interval(),
    )?;

    render.run(stop)?;
    Ok(())
}
