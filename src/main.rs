use ch_optimizer::engine::{
    ClickHouseClassifier, ClickHouseConnector, CycleStatus, Scheduler, SchedulerOptions,
};
use ch_optimizer::logging;
use ch_optimizer::shared::config::{Cli, Settings, load_settings};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, trace, warn};

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// The first signal lets the running merge finish and stops the scheduler,
/// a second one exits right away.
async fn shutdown_signal(shutdown: CancellationToken) {
    wait_for_signal().await;
    warn!("Termination signal received, stopping after the running merge. Repeat to exit now");
    shutdown.cancel();

    wait_for_signal().await;
    error!("Second termination signal received, exiting");
    std::process::exit(130);
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.print_defaults {
        println!("{}", Settings::defaults_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let settings = load_settings(&cli)?;
    let _guard = logging::init(&settings.logging)?;
    trace!("The config is:\n{}", settings.to_toml()?);

    let options = SchedulerOptions::from_settings(&settings);
    let one_shot = options.is_one_shot();
    let scheduler = Scheduler::new(
        ClickHouseConnector::new(settings.clickhouse.server_dsn.clone()),
        Arc::new(ClickHouseClassifier::default()),
        options,
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let worker = tokio::spawn(async move { scheduler.run(shutdown).await });

    let code = match worker.await? {
        Ok(CycleStatus::Succeeded) => ExitCode::SUCCESS,
        Ok(CycleStatus::Failed) if one_shot => ExitCode::FAILURE,
        Ok(CycleStatus::Failed) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Stopping: {}", e);
            ExitCode::FAILURE
        }
    };
    Ok(code)
}
