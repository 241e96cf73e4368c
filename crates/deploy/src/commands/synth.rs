//! Synth command - write stack templates for the provisioning engine.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use eks_blueprint::{App, DeployConfig, OrderingMode, OutputFormat, SynthEngine};
use tracing::info;

use crate::ui;

/// Default directory receiving synthesized templates.
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// Environment variable overriding the output directory.
pub const ENV_OUT_DIR: &str = "DEPLOY_OUT";

/// Compose both stacks and write them to disk.
#[derive(Args)]
pub struct SynthCommand {
    /// Directory receiving the templates and manifest.
    #[arg(short, long, env = ENV_OUT_DIR, default_value = DEFAULT_OUT_DIR)]
    pub(crate) out: PathBuf,

    /// Template format (json, yaml).
    #[arg(long, default_value = "json")]
    pub(crate) format: OutputFormat,

    /// Reorder add-ons into dependency order instead of rejecting the list.
    #[arg(long)]
    pub(crate) resolve: bool,
}

impl Default for SynthCommand {
    fn default() -> Self {
        Self {
            out: std::env::var_os(ENV_OUT_DIR)
                .map_or_else(|| PathBuf::from(DEFAULT_OUT_DIR), PathBuf::from),
            format: OutputFormat::default(),
            resolve: false,
        }
    }
}

impl SynthCommand {
    /// Run the synth command.
    ///
    /// # Errors
    ///
    /// Returns an error if the composition is invalid or a template cannot be written.
    pub async fn run(&self, config: &DeployConfig) -> Result<()> {
        ui::print_section(&format!("Synthesizing {} deployment", config.profile));

        ui::print_progress_step(1, 2, "Composing stacks");
        let ordering = if self.resolve {
            OrderingMode::Resolve
        } else {
            OrderingMode::Strict
        };
        let app = App::synth_with(config, ordering).context("Failed to compose stacks")?;
        ui::print_config_summary(config, &app);

        ui::print_progress_step(2, 2, "Writing templates");
        let engine = SynthEngine::new(&self.out, self.format);
        let reports = app
            .deploy(&engine)
            .await
            .with_context(|| format!("Failed to synthesize to {}", self.out.display()))?;

        for report in &reports {
            let path = report.artifact.as_ref().map(|p| p.display().to_string());
            ui::print_check_result(&report.stack_id, path.is_some(), path.as_deref());
        }

        info!(stacks = reports.len(), out = %self.out.display(), "Synthesis complete");
        ui::print_success(&format!(
            "Synthesized {} stacks to {}",
            reports.len(),
            self.out.display()
        ));
        Ok(())
    }
}
