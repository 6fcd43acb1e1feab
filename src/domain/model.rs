use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGroup {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// One column of an item as returned by the board API.
///
/// `value` is the column's raw JSON encoded as a string; `text` is the
/// rendered plain-text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnValue {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default = "default_column_type")]
    pub column_type: String,
}

fn default_column_type() -> String {
    "text".to_string()
}

impl ColumnValue {
    /// Absent values and the literal `null` marker carry nothing to copy.
    pub fn is_empty(&self) -> bool {
        match self.value.as_deref() {
            None => true,
            Some(raw) => raw.is_empty() || raw == "null",
        }
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub group: Option<ItemGroup>,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

impl Item {
    pub fn group_id(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.id.as_str())
    }

    pub fn group_title(&self) -> &str {
        self.group.as_ref().map(|g| g.title.as_str()).unwrap_or("")
    }
}

/// What the board API hands back after a create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: String,
    pub name: String,
}

/// Decision made before any write: create a new item or patch an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlannedAction {
    Create { group_id: String },
    Update { item_id: String },
}

impl PlannedAction {
    pub fn label(&self) -> &'static str {
        match self {
            PlannedAction::Create { .. } => "CREATE",
            PlannedAction::Update { .. } => "UPDATE",
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, PlannedAction::Update { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeAction {
    Created,
    Updated,
    Cancelled,
}

impl fmt::Display for OutcomeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeAction::Created => "CREATED",
            OutcomeAction::Updated => "UPDATED",
            OutcomeAction::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationOutcome {
    pub source_item_id: String,
    pub dest_item_id: Option<String>,
    pub item_name: String,
    pub action: OutcomeAction,
    pub was_updated: bool,
    pub mapped_columns: usize,
    pub unmapped_columns: usize,
}

impl DuplicationOutcome {
    pub fn cancelled(source_item: &Item) -> Self {
        Self {
            source_item_id: source_item.id.clone(),
            dest_item_id: None,
            item_name: source_item.name.clone(),
            action: OutcomeAction::Cancelled,
            was_updated: false,
            mapped_columns: 0,
            unmapped_columns: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub source_name: String,
    pub dest_name: String,
    pub value: String,
}

/// Everything a person needs to approve or decline one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub action: PlannedAction,
    pub item_name: String,
    pub source_board_name: String,
    pub dest_board_id: u64,
    pub dest_group_id: String,
    pub dest_board_name: String,
    pub rows: Vec<PreviewRow>,
}

impl Preview {
    pub fn action_label(&self) -> &'static str {
        self.action.label()
    }
}
