use std::sync::Arc;

use clap::Parser as _;
use dotenvy::dotenv;
use site_orchestrator::cli::{Cli, Commands, RunCmd, SetupCmd};
use site_orchestrator::core::config::Config;
use site_orchestrator::server::setup_server;
use site_orchestrator::setup::setup;
use site_orchestrator::types::params::OTELConfig;
use site_orchestrator::utils::instrument::OrchestratorInstrumentation;
use site_orchestrator::utils::logging::init_logging;
use site_orchestrator::utils::signal_handler::SignalHandler;
use site_orchestrator::utils::startup_info::log_startup_info;
use site_orchestrator::worker::initialize_worker;
use site_orchestrator::{OrchestratorError, OrchestratorResult};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { run_command } => run_orchestrator(&run_command).await,
        Commands::Setup { setup_command } => setup_orchestrator(&setup_command).await,
    };

    if let Err(e) = result {
        error!(error = %e, error_chain = ?e, "Orchestrator exited with an error");
        std::process::exit(1);
    }
}

async fn run_orchestrator(run_cmd: &RunCmd) -> OrchestratorResult<()> {
    let otel_config = OTELConfig::try_from(run_cmd.instrumentation_args.clone())?;
    let instrumentation = OrchestratorInstrumentation::new(&otel_config)?;
    init_logging(instrumentation.tracer())?;
    info!("Starting orchestrator service");

    let config = Arc::new(Config::from_run_cmd(run_cmd).await?);
    log_startup_info(&config);

    let (address, server_handle) = setup_server(config.clone()).await?;
    info!(%address, "Application router initialized");

    let mut signal_handler = SignalHandler::new();
    let mut worker_controller = initialize_worker(config.clone(), signal_handler.shutdown_trigger());

    let signal = signal_handler.wait_for_shutdown().await?;
    info!(%signal, "Shutdown requested");

    let shutdown_timeout = config.service_config().shutdown_timeout();
    signal_handler
        .handle_graceful_shutdown(
            move || async move {
                worker_controller.shutdown().await;
                server_handle
                    .shutdown()
                    .await
                    .map_err(|e| OrchestratorError::ServerError(format!("server task failed: {}", e)))?;
                Ok(())
            },
            shutdown_timeout,
        )
        .await?;

    instrumentation.shutdown()?;
    info!("Orchestrator service shut down");
    Ok(())
}

/// setup_orchestrator - Creates the store's indexes
async fn setup_orchestrator(setup_cmd: &SetupCmd) -> OrchestratorResult<()> {
    init_logging(None)?;
    setup(setup_cmd).await?;
    info!("Orchestrator setup completed successfully");
    Ok(())
}
