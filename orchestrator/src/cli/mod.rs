use clap::{Parser, Subcommand};

pub mod database;
pub mod deployment;
pub mod instrumentation;
pub mod provider;
pub mod server;
pub mod service;
pub mod verification;

#[derive(Parser, Debug)]
#[command(
    name = "site-orchestrator",
    about = "Site Orchestrator - deploys generated project sites and manages their custom domains",
    long_about = "Site Orchestrator runs the durable deployment queue, the deployment workers that publish a \
    project's site to the hosting provider, and the worker that tracks custom domain verification.\n\n\
    Quick Start:\n  \
    site-orchestrator setup\n  \
    site-orchestrator run --vercel-api-token <TOKEN>",
    after_help = "Every flag can also be set through its SITE_ORCHESTRATOR_* environment variable."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the orchestrator service
    #[command(long_about = "Start the HTTP API, the deployment workers, the retry sweeper and the domain \
        verification worker.")]
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
    /// Setup the orchestrator infrastructure
    #[command(long_about = "Create the collections and indexes the queue relies on. Safe to run repeatedly.")]
    Setup {
        #[command(flatten)]
        setup_command: Box<SetupCmd>,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RunCmd {
    #[clap(flatten)]
    pub database_args: database::DatabaseCliArgs,

    #[clap(flatten)]
    pub vercel_args: provider::vercel::VercelCliArgs,

    #[clap(flatten)]
    pub server_args: server::ServerCliArgs,

    #[clap(flatten)]
    pub service_args: service::ServiceCliArgs,

    #[clap(flatten)]
    pub deployment_args: deployment::DeploymentCliArgs,

    #[clap(flatten)]
    pub verification_args: verification::VerificationCliArgs,

    #[clap(flatten)]
    pub instrumentation_args: instrumentation::InstrumentationCliArgs,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct SetupCmd {
    #[clap(flatten)]
    pub mongodb_args: database::mongodb::MongoDBCliArgs,
}
