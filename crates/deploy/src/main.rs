//! EKS deployment CLI.
//!
//! Reads the target account and region from the environment, composes the
//! monitoring and cluster stacks, and hands them to the provisioning engine.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eks_blueprint::config::ENV_PROFILE;
use eks_blueprint::{DeployConfig, Profile};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod ui;

use commands::plan::PlanCommand;
use commands::synth::SynthCommand;

/// EKS blueprint deployment.
#[derive(Parser)]
#[command(
    name = "deploy",
    version,
    about = "Compose and synthesize the EKS cluster and monitoring stacks",
    long_about = "Compose the managed monitoring stack and the EKS blueprint.\n\n\
                  The target environment comes from AWS_ACCOUNT_ID and AWS_REGION.\n\
                  DEPLOY_PROFILE (or --profile) selects the dev or prod composition.\n\n\
                  Without a subcommand, stacks are synthesized to the output directory."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Environment profile (dev, prod).
    #[arg(short, long, global = true, env = ENV_PROFILE, value_name = "PROFILE")]
    profile: Option<Profile>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the stack templates and manifest for the provisioning engine.
    Synth(SynthCommand),

    /// Print the composed deployment without writing anything.
    Plan(PlanCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info,eks_blueprint=debug,deploy=debug")
        } else {
            EnvFilter::new("warn,eks_blueprint=info,deploy=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // clap already resolved --profile over DEPLOY_PROFILE
    let config = DeployConfig::from_env_with(cli.profile.unwrap_or_default())
        .context("Failed to read deployment configuration")?;
    debug!(
        account = %config.account,
        region = %config.region,
        profile = %config.profile,
        "Loaded configuration"
    );

    match cli.command {
        Some(Commands::Synth(cmd)) => cmd.run(&config).await,
        Some(Commands::Plan(cmd)) => cmd.run(&config),
        None => SynthCommand::default().run(&config).await,
    }
}
