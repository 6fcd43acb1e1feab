use crate::config::workflow_config::{Destination, Workflow, WorkflowConfig};
use crate::core::engine::{BatchReport, DuplicationEngine};
use crate::core::resolver::ResolvedMapping;
use crate::domain::model::DuplicationOutcome;
use crate::domain::ports::{BoardClient, ConfirmationGate};
use crate::utils::error::{DuplicatorError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    SingleItem(String),
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DestinationResult {
    Single(DuplicationOutcome),
    Batch(BatchReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationReport {
    pub board_id: u64,
    pub board_name: String,
    pub template: Option<String>,
    pub mapped_column_count: usize,
    /// `Err` holds the message of a failure confined to this destination.
    pub result: std::result::Result<DestinationResult, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub workflow_id: String,
    pub workflow_name: String,
    pub destinations: Vec<DestinationReport>,
    /// Set when the user quit; later destinations were not visited.
    pub aborted: bool,
}

impl WorkflowReport {
    pub fn failed_destinations(&self) -> usize {
        self.destinations.iter().filter(|d| d.result.is_err()).count()
    }
}

/// Runs a workflow against each of its destinations in declared order.
pub struct WorkflowRunner<'a, C: BoardClient, G: ConfirmationGate> {
    config: &'a WorkflowConfig,
    engine: &'a DuplicationEngine<C, G>,
}

impl<'a, C: BoardClient, G: ConfirmationGate> WorkflowRunner<'a, C, G> {
    pub fn new(config: &'a WorkflowConfig, engine: &'a DuplicationEngine<C, G>) -> Self {
        Self { config, engine }
    }

    /// A failure at one destination is recorded and the next one still runs.
    ///
    /// A user abort ends the workflow; the report then holds the destinations
    /// completed so far and has `aborted` set.
    pub async fn run(&self, workflow: &Workflow, mode: &RunMode) -> Result<WorkflowReport> {
        tracing::info!("🚀 Running workflow: {}", workflow.name);

        let mut destinations = Vec::with_capacity(workflow.destinations.len());
        let mut aborted = false;
        for (index, destination) in workflow.destinations.iter().enumerate() {
            tracing::info!(
                "📍 Destination {}/{}: {}",
                index + 1,
                workflow.destinations.len(),
                destination.board_name
            );

            let mapping = self.config.resolve(destination);
            tracing::info!(
                "Template: {}, column mappings: {}",
                destination.template.as_deref().unwrap_or("None"),
                mapping.len()
            );

            let result = match self
                .run_destination(workflow, destination, &mapping, mode)
                .await
            {
                Ok(result) => {
                    aborted = matches!(&result, DestinationResult::Batch(batch) if batch.aborted);
                    Ok(result)
                }
                Err(DuplicatorError::UserAbortError) => {
                    tracing::warn!("⏹️  Workflow stopped by user at '{}'", destination.board_name);
                    aborted = true;
                    break;
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Error processing destination '{}': {}",
                        destination.board_name,
                        e
                    );
                    Err(e.to_string())
                }
            };

            destinations.push(DestinationReport {
                board_id: destination.board_id,
                board_name: destination.board_name.clone(),
                template: destination.template.clone(),
                mapped_column_count: mapping.len(),
                result,
            });
            if aborted {
                tracing::warn!("⏹️  Workflow stopped by user at '{}'", destination.board_name);
                break;
            }
        }

        Ok(WorkflowReport {
            workflow_id: workflow.id.clone(),
            workflow_name: workflow.name.clone(),
            destinations,
            aborted,
        })
    }

    async fn run_destination(
        &self,
        workflow: &Workflow,
        destination: &Destination,
        mapping: &ResolvedMapping,
        mode: &RunMode,
    ) -> Result<DestinationResult> {
        match mode {
            RunMode::SingleItem(name) => self
                .engine
                .duplicate_by_name(name, &workflow.source, destination, mapping)
                .await
                .map(DestinationResult::Single),
            RunMode::Batch => self
                .engine
                .duplicate_group(&workflow.source, destination, mapping)
                .await
                .map(DestinationResult::Batch),
        }
    }
}
