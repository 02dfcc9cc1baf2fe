//! vibecam CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vibecam::cli::{
    app::{load_merged_config, resolve_options, run_record, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    daemon_app::run_daemon,
    daemon_cmd::handle_daemon_command,
    devices_cmd::handle_devices_command,
    presenter::Presenter,
};
use vibecam::domain::config::AppConfig;
use vibecam::domain::recording::ContainerFormat;
use vibecam::infrastructure::{SystemDeviceEnumerator, XdgConfigStore};

fn init_tracing(verbose: bool) {
    let default = if verbose { "vibecam=debug" } else { "vibecam=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Daemon { action }) => {
            if let Err(e) = handle_daemon_command(action, &presenter).await {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Devices) => {
            let enumerator = SystemDeviceEnumerator::new();
            if let Err(e) = handle_devices_command(&enumerator, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Build CLI config from args; unset flags defer to file/env
    let cli_config = AppConfig {
        camera: cli.camera.then_some(true),
        microphone: cli.mic_override(),
        output_dir: cli.output_dir.clone(),
        container: cli
            .container
            .map(|c| ContainerFormat::from(c).extension().to_string()),
        max_duration: cli.max_duration.clone(),
        notify: cli.notify.then_some(true),
        audio_cues: cli.audio_cues.then_some(true),
        ..Default::default()
    };

    let config = load_merged_config(cli_config).await;
    let options = match resolve_options(&config) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&format!("Invalid max-duration: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    if cli.daemon {
        run_daemon(options).await
    } else {
        run_record(options).await
    }
}
