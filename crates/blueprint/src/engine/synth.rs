//! Engine that writes stack templates to an output directory.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Map};
use tracing::{debug, info};

use super::{ApplyReport, EngineError, OutputFormat, ProvisioningEngine, StackArtifact};

/// Name of the index written next to the stack templates.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Writes one template file per stack plus a manifest listing them in order.
#[derive(Debug, Clone)]
pub struct SynthEngine {
    out_dir: PathBuf,
    format: OutputFormat,
}

impl SynthEngine {
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            out_dir: out_dir.into(),
            format,
        }
    }

    fn template_path(&self, stack_id: &str) -> PathBuf {
        self.out_dir
            .join(format!("{stack_id}.{}", self.format.extension()))
    }
}

#[async_trait]
impl ProvisioningEngine for SynthEngine {
    async fn apply(&self, stack: &StackArtifact) -> Result<ApplyReport, EngineError> {
        let rendered = self.format.render(&stack.to_value()?)?;
        let path = self.template_path(stack.id());

        tokio::fs::create_dir_all(&self.out_dir).await?;
        tokio::fs::write(&path, rendered).await?;
        info!(stack = stack.id(), path = %path.display(), "Wrote stack template");

        Ok(ApplyReport {
            stack_id: stack.id().to_string(),
            depends_on: stack.depends_on(),
            artifact: Some(path),
        })
    }

    async fn finalize(&self, reports: &[ApplyReport]) -> Result<(), EngineError> {
        let mut artifacts = Map::new();
        for report in reports {
            let file = report
                .artifact
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned());
            artifacts.insert(
                report.stack_id.clone(),
                json!({ "file": file, "dependencies": report.depends_on }),
            );
        }
        let order: Vec<&str> = reports.iter().map(|r| r.stack_id.as_str()).collect();
        let manifest = json!({
            "version": "1",
            "format": self.format.extension(),
            "order": order,
            "artifacts": artifacts,
        });

        tokio::fs::create_dir_all(&self.out_dir).await?;
        let path = self.out_dir.join(MANIFEST_FILE);
        tokio::fs::write(&path, serde_json::to_string_pretty(&manifest)?).await?;
        debug!(path = %path.display(), stacks = reports.len(), "Wrote manifest");
        Ok(())
    }
}
