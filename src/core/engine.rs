//! Duplication engine: resolve target, encode columns, confirm, write.

use crate::config::workflow_config::{Destination, Source};
use crate::core::codec::encode_column;
use crate::core::reconciler::reconcile;
use crate::core::resolver::ResolvedMapping;
use crate::domain::model::{
    ColumnValue, DuplicationOutcome, Item, OutcomeAction, PlannedAction, Preview, PreviewRow,
};
use crate::domain::ports::{BoardClient, ColumnPatch, ConfirmationGate, NoopReporter, ReportSink};
use crate::utils::error::{DuplicatorError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Writes computed for one item, awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub action: PlannedAction,
    pub column_values: ColumnPatch,
    pub mapped_summary: Vec<String>,
    pub unmapped_columns: Vec<String>,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item_name: String,
    pub error: String,
}

/// Result of running every item of a source group against one destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total_items: usize,
    pub outcomes: Vec<DuplicationOutcome>,
    pub failures: Vec<ItemFailure>,
    /// Set when the user quit; items after that point were not visited.
    pub aborted: bool,
}

impl BatchReport {
    fn count(&self, action: OutcomeAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn created(&self) -> usize {
        self.count(OutcomeAction::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(OutcomeAction::Updated)
    }

    pub fn cancelled(&self) -> usize {
        self.count(OutcomeAction::Cancelled)
    }

    pub fn succeeded(&self) -> usize {
        self.created() + self.updated()
    }
}

pub struct DuplicationEngine<C: BoardClient, G: ConfirmationGate> {
    client: C,
    gate: G,
    reporter: Arc<dyn ReportSink>,
}

impl<C: BoardClient, G: ConfirmationGate> DuplicationEngine<C, G> {
    pub fn new(client: C, gate: G) -> Self {
        Self {
            client,
            gate,
            reporter: Arc::new(NoopReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ReportSink>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Looks up the destination item and encodes every mapped column.
    ///
    /// Nothing is written; the returned change still needs confirmation.
    pub async fn plan(
        &self,
        source_item: &Item,
        source: &Source,
        destination: &Destination,
        mapping: &ResolvedMapping,
    ) -> Result<PendingChange> {
        tracing::info!(
            "Processing item '{}' (id {}) from group '{}'",
            source_item.name,
            source_item.id,
            source_item.group_title()
        );

        let source_columns: HashMap<&str, &ColumnValue> = source_item
            .column_values
            .iter()
            .map(|col| (col.id.as_str(), col))
            .collect();

        let action = reconcile(
            &self.client,
            destination.board_id,
            &destination.group_id,
            &source_item.name,
        )
        .await?;

        let mut column_values = ColumnPatch::new();
        let mut mapped_summary = Vec::new();
        let mut unmapped_columns = Vec::new();
        let mut rows = vec![PreviewRow {
            source_name: "Name".to_string(),
            dest_name: "Name".to_string(),
            value: source_item.name.clone(),
        }];

        for (source_col_id, dest_col_id) in &mapping.columns {
            let encoded = source_columns
                .get(source_col_id.as_str())
                .and_then(|col| encode_column(col));

            let Some(encoded) = encoded else {
                tracing::debug!("Column '{}' has no value to copy", source_col_id);
                unmapped_columns.push(source_col_id.clone());
                continue;
            };

            let source_name = mapping.display_name(source_col_id);
            let dest_name = mapping.display_name(dest_col_id);
            mapped_summary.push(format!(
                "{} ({}) → {} ({}): {}",
                source_name,
                source.board_name,
                dest_name,
                destination.board_name,
                encoded.describe()
            ));
            rows.push(PreviewRow {
                source_name: source_name.to_string(),
                dest_name: dest_name.to_string(),
                value: encoded.display.clone(),
            });
            column_values.insert(dest_col_id.clone(), encoded.value);
        }

        let preview = Preview {
            action: action.clone(),
            item_name: source_item.name.clone(),
            source_board_name: source.board_name.clone(),
            dest_board_id: destination.board_id,
            dest_group_id: destination.group_id.clone(),
            dest_board_name: destination.board_name.clone(),
            rows,
        };

        Ok(PendingChange {
            action,
            column_values,
            mapped_summary,
            unmapped_columns,
            preview,
        })
    }

    /// Submits an approved change. Transport failures are returned as-is.
    pub async fn apply(
        &self,
        source_item: &Item,
        destination: &Destination,
        pending: &PendingChange,
    ) -> Result<DuplicationOutcome> {
        let (result_item, action) = match &pending.action {
            PlannedAction::Update { item_id } => {
                tracing::info!(
                    "Updating item {} in board {}",
                    item_id,
                    destination.board_id
                );
                let item = self
                    .client
                    .update_item(destination.board_id, item_id, &pending.column_values)
                    .await?;
                (item, OutcomeAction::Updated)
            }
            PlannedAction::Create { group_id } => {
                tracing::info!(
                    "Creating item '{}' in board {}, group '{}'",
                    source_item.name,
                    destination.board_id,
                    group_id
                );
                let item = self
                    .client
                    .create_item(
                        destination.board_id,
                        group_id,
                        &source_item.name,
                        &pending.column_values,
                    )
                    .await?;
                (item, OutcomeAction::Created)
            }
        };

        tracing::info!("✅ Item {} {}", result_item.id, action);

        Ok(DuplicationOutcome {
            source_item_id: source_item.id.clone(),
            dest_item_id: Some(result_item.id),
            item_name: result_item.name,
            action,
            was_updated: pending.action.is_update(),
            mapped_columns: pending.mapped_summary.len(),
            unmapped_columns: pending.unmapped_columns.len(),
        })
    }

    /// Plans, asks the gate, and writes one item into one destination.
    pub async fn duplicate_item(
        &self,
        source_item: &Item,
        source: &Source,
        destination: &Destination,
        mapping: &ResolvedMapping,
    ) -> Result<DuplicationOutcome> {
        let pending = self.plan(source_item, source, destination, mapping).await?;
        self.reporter.preview(&pending.preview);

        if !self.gate.confirm(&pending.preview)? {
            tracing::info!(
                "{} of '{}' cancelled",
                pending.action.label(),
                source_item.name
            );
            let outcome = DuplicationOutcome::cancelled(source_item);
            self.reporter.outcome(&outcome, &[]);
            return Ok(outcome);
        }

        let outcome = self.apply(source_item, destination, &pending).await?;
        self.reporter.outcome(&outcome, &pending.mapped_summary);
        Ok(outcome)
    }

    /// Finds the source item by name, then duplicates it.
    pub async fn duplicate_by_name(
        &self,
        item_name: &str,
        source: &Source,
        destination: &Destination,
        mapping: &ResolvedMapping,
    ) -> Result<DuplicationOutcome> {
        tracing::info!(
            "Searching for item '{}' in board {}",
            item_name,
            source.board_id
        );
        let source_item = self
            .client
            .find_item(source.board_id, item_name)
            .await?
            .ok_or_else(|| DuplicatorError::ItemNotFoundError {
                name: item_name.to_string(),
                board_id: source.board_id,
            })?;

        self.duplicate_item(&source_item, source, destination, mapping)
            .await
    }

    /// Duplicates every item in the source group.
    pub async fn duplicate_group(
        &self,
        source: &Source,
        destination: &Destination,
        mapping: &ResolvedMapping,
    ) -> Result<BatchReport> {
        tracing::info!(
            "Fetching items from {} / {}",
            source.board_name,
            source.group_id
        );
        let items = self
            .client
            .list_items(source.board_id, &source.group_id)
            .await?;

        if items.is_empty() {
            tracing::warn!("No items found in group '{}'", source.group_id);
        } else {
            tracing::info!("Found {} item(s) to process", items.len());
        }

        self.duplicate_items(&items, source, destination, mapping)
            .await
    }

    /// Runs items one after another; a failing item is logged and skipped.
    ///
    /// A user abort stops the batch early and returns what was done so far
    /// with `aborted` set.
    pub async fn duplicate_items(
        &self,
        items: &[Item],
        source: &Source,
        destination: &Destination,
        mapping: &ResolvedMapping,
    ) -> Result<BatchReport> {
        let mut report = BatchReport {
            total_items: items.len(),
            ..BatchReport::default()
        };

        for (index, item) in items.iter().enumerate() {
            tracing::info!("Processing item {}/{}", index + 1, items.len());

            match self.duplicate_item(item, source, destination, mapping).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(DuplicatorError::UserAbortError) => {
                    tracing::warn!(
                        "⏹️  Batch stopped by user after {}/{} item(s)",
                        index,
                        items.len()
                    );
                    report.aborted = true;
                    break;
                }
                Err(e) => {
                    tracing::error!("❌ Failed to process '{}': {}", item.name, e);
                    report.failures.push(ItemFailure {
                        item_name: item.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Batch finished: {}/{} succeeded ({} created, {} updated, {} cancelled, {} failed)",
            report.succeeded(),
            report.total_items,
            report.created(),
            report.updated(),
            report.cancelled(),
            report.failures.len()
        );

        Ok(report)
    }
}
