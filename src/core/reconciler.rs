use crate::domain::model::PlannedAction;
use crate::domain::ports::BoardClient;
use crate::utils::error::Result;

/// Decides whether the destination already holds an item with this name.
///
/// Matching is exact name equality as provided by the board's name search, so
/// two unrelated items sharing a name will be treated as the same record.
pub async fn reconcile<C: BoardClient + ?Sized>(
    client: &C,
    board_id: u64,
    group_id: &str,
    item_name: &str,
) -> Result<PlannedAction> {
    match client.find_item(board_id, item_name).await? {
        Some(existing) => {
            tracing::info!(
                "Item '{}' already exists in board {} (id {}, group '{}'), will update",
                item_name,
                board_id,
                existing.id,
                existing.group_title()
            );
            Ok(PlannedAction::Update {
                item_id: existing.id,
            })
        }
        None => {
            tracing::info!(
                "No item named '{}' in board {}, will create in group '{}'",
                item_name,
                board_id,
                group_id
            );
            Ok(PlannedAction::Create {
                group_id: group_id.to_string(),
            })
        }
    }
}
