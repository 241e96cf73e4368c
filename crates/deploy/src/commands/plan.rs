//! Plan command - show the composition without writing artifacts.

use anyhow::{Context, Result};
use clap::Args;
use eks_blueprint::{App, DeployConfig, OrderingMode, StackArtifact};

use crate::ui;

/// Print the composed stacks.
#[derive(Args)]
pub struct PlanCommand {
    /// Output the stack documents as JSON.
    #[arg(long, default_value = "false")]
    pub(crate) json: bool,

    /// Reorder add-ons into dependency order instead of rejecting the list.
    #[arg(long)]
    resolve: bool,
}

impl PlanCommand {
    /// Run the plan command.
    ///
    /// # Errors
    ///
    /// Returns an error if the composition is invalid.
    pub fn run(&self, config: &DeployConfig) -> Result<()> {
        let ordering = if self.resolve {
            OrderingMode::Resolve
        } else {
            OrderingMode::Strict
        };
        let app = App::synth_with(config, ordering).context("Failed to compose stacks")?;

        if self.json {
            let documents = app
                .stacks()
                .iter()
                .map(StackArtifact::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&documents)?);
            return Ok(());
        }

        ui::print_section(&format!("Deployment plan ({})", config.profile));
        ui::print_config_summary(config, &app);
        ui::print_add_ons(app.cluster.add_ons());
        Ok(())
    }
}
