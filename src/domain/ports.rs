use crate::domain::model::{DuplicationOutcome, Item, ItemRef, Preview};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Column values keyed by destination column id, ready to send.
pub type ColumnPatch = Map<String, Value>;

/// Remote board store the engine reads from and writes to.
#[async_trait]
pub trait BoardClient: Send + Sync {
    async fn find_item(&self, board_id: u64, name: &str) -> Result<Option<Item>>;
    async fn list_items(&self, board_id: u64, group_id: &str) -> Result<Vec<Item>>;
    async fn create_item(
        &self,
        board_id: u64,
        group_id: &str,
        name: &str,
        column_values: &ColumnPatch,
    ) -> Result<ItemRef>;
    async fn update_item(
        &self,
        board_id: u64,
        item_id: &str,
        column_values: &ColumnPatch,
    ) -> Result<ItemRef>;
}

#[async_trait]
impl<T: BoardClient + ?Sized> BoardClient for Arc<T> {
    async fn find_item(&self, board_id: u64, name: &str) -> Result<Option<Item>> {
        (**self).find_item(board_id, name).await
    }

    async fn list_items(&self, board_id: u64, group_id: &str) -> Result<Vec<Item>> {
        (**self).list_items(board_id, group_id).await
    }

    async fn create_item(
        &self,
        board_id: u64,
        group_id: &str,
        name: &str,
        column_values: &ColumnPatch,
    ) -> Result<ItemRef> {
        (**self)
            .create_item(board_id, group_id, name, column_values)
            .await
    }

    async fn update_item(
        &self,
        board_id: u64,
        item_id: &str,
        column_values: &ColumnPatch,
    ) -> Result<ItemRef> {
        (**self).update_item(board_id, item_id, column_values).await
    }
}

/// Approval policy consulted before every write.
///
/// Returning `Ok(false)` declines the single item; an `Err` aborts the run.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, preview: &Preview) -> Result<bool>;
}

impl<T: ConfirmationGate + ?Sized> ConfirmationGate for Arc<T> {
    fn confirm(&self, preview: &Preview) -> Result<bool> {
        (**self).confirm(preview)
    }
}

/// Receives the per-item preview and final outcome for rendering.
pub trait ReportSink: Send + Sync {
    fn preview(&self, _preview: &Preview) {}

    fn outcome(&self, _outcome: &DuplicationOutcome, _mapped_summary: &[String]) {}
}

pub struct NoopReporter;

impl ReportSink for NoopReporter {}
