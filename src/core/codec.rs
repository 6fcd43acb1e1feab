//! Column value codec.
//!
//! Turns one source column (plain text, raw JSON value, type tag) into the
//! value shape the destination board expects. Never fails: a raw value that is
//! not valid JSON falls back to the column's plain text.

use crate::domain::model::ColumnValue;
use serde_json::{json, Value};

/// Known column types, plus a catch-all carrying the original tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Link,
    BoardRelation,
    Other(String),
}

impl ColumnKind {
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            "text" => ColumnKind::Text,
            "link" => ColumnKind::Link,
            "board-relation" => ColumnKind::BoardRelation,
            other => ColumnKind::Other(other.to_string()),
        }
    }
}

/// A destination-ready column value.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    pub value: Value,
    /// Short form shown in previews, e.g. the URL or "2 linked item(s)".
    pub display: String,
    /// True when the value was copied as plain text.
    pub as_text: bool,
}

impl EncodedColumn {
    fn text(text: &str) -> Self {
        Self {
            value: Value::String(text.to_string()),
            display: text.to_string(),
            as_text: true,
        }
    }

    /// One-line description of what was mapped; plain text is quoted.
    pub fn describe(&self) -> String {
        if self.as_text {
            format!("'{}'", self.display)
        } else {
            self.display.clone()
        }
    }
}

/// Encodes a column for the destination.
///
/// Returns `None` when the column has nothing to copy: an absent or `null`
/// raw value, or a board relation with no linked items.
pub fn encode_column(column: &ColumnValue) -> Option<EncodedColumn> {
    if column.is_empty() {
        return None;
    }
    let raw = column.value.as_deref().unwrap_or_default();
    let text = column.text_or_empty();

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(
                "Column '{}' value is not JSON ({}), using text",
                column.id,
                e
            );
            return Some(EncodedColumn::text(text));
        }
    };

    match ColumnKind::from_type_tag(&column.column_type) {
        ColumnKind::Text => Some(EncodedColumn::text(text)),
        ColumnKind::Link => {
            let url = parsed
                .get("url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(EncodedColumn {
                value: json!({ "url": url, "text": url }),
                display: url,
                as_text: false,
            })
        }
        ColumnKind::BoardRelation => {
            let item_ids = linked_item_ids(&parsed);
            if item_ids.is_empty() {
                return None;
            }
            Some(EncodedColumn {
                display: format!("{} linked item(s)", item_ids.len()),
                value: json!({ "item_ids": item_ids }),
                as_text: false,
            })
        }
        ColumnKind::Other(_) => Some(EncodedColumn {
            value: parsed,
            display: text.to_string(),
            as_text: false,
        }),
    }
}

/// Numeric ids of linked items, in the order the relation lists them.
///
/// Ids may arrive as numbers or numeric strings; anything else is dropped.
pub fn linked_item_ids(raw: &Value) -> Vec<i64> {
    raw.get("linkedPulseIds")
        .and_then(Value::as_array)
        .map(|linked| {
            linked
                .iter()
                .filter_map(|entry| match entry.get("linkedPulseId") {
                    Some(Value::Number(n)) => n.as_i64(),
                    Some(Value::String(s)) => s.trim().parse().ok(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(column_type: &str, text: Option<&str>, value: Option<&str>) -> ColumnValue {
        ColumnValue {
            id: "col".to_string(),
            text: text.map(str::to_string),
            value: value.map(str::to_string),
            column_type: column_type.to_string(),
        }
    }

    #[test]
    fn test_text_passes_plain_text_through() {
        let encoded = encode_column(&column("text", Some("Active"), Some("\"Active\""))).unwrap();
        assert_eq!(encoded.value, json!("Active"));
        assert_eq!(encoded.describe(), "'Active'");
    }

    #[test]
    fn test_link_uses_url_for_both_fields() {
        let encoded =
            encode_column(&column("link", Some("x"), Some(r#"{"url": "http://x"}"#))).unwrap();
        assert_eq!(encoded.value, json!({"url": "http://x", "text": "http://x"}));
        assert_eq!(encoded.display, "http://x");
    }

    #[test]
    fn test_link_without_url_is_empty_url() {
        let encoded = encode_column(&column("link", None, Some(r#"{"text": "x"}"#))).unwrap();
        assert_eq!(encoded.value, json!({"url": "", "text": ""}));
    }

    #[test]
    fn test_board_relation_extracts_ids() {
        let raw = r#"{"linkedPulseIds": [{"linkedPulseId": 11}, {"linkedPulseId": "12"}]}"#;
        let encoded = encode_column(&column("board-relation", Some("A, B"), Some(raw))).unwrap();
        assert_eq!(encoded.value, json!({"item_ids": [11, 12]}));
        assert!(encoded.describe().contains("2 linked item(s)"));
    }

    #[test]
    fn test_empty_board_relation_is_skipped() {
        let raw = r#"{"linkedPulseIds": []}"#;
        assert!(encode_column(&column("board-relation", Some(""), Some(raw))).is_none());
    }

    #[test]
    fn test_null_and_absent_values_are_skipped() {
        assert!(encode_column(&column("text", Some("x"), None)).is_none());
        assert!(encode_column(&column("text", Some("x"), Some("null"))).is_none());
        assert!(encode_column(&column("status", Some("x"), Some(""))).is_none());
    }

    #[test]
    fn test_invalid_json_falls_back_to_text() {
        let encoded = encode_column(&column("link", Some("plain"), Some("not json"))).unwrap();
        assert_eq!(encoded.value, json!("plain"));
        assert!(encoded.as_text);
    }

    #[test]
    fn test_other_types_copy_raw_value() {
        let raw = r#"{"index": 1, "post_id": null}"#;
        let encoded = encode_column(&column("status", Some("Working on it"), Some(raw))).unwrap();
        assert_eq!(encoded.value, json!({"index": 1, "post_id": null}));
        assert_eq!(encoded.display, "Working on it");
    }

    #[test]
    fn test_kind_from_type_tag() {
        assert_eq!(ColumnKind::from_type_tag("link"), ColumnKind::Link);
        assert_eq!(ColumnKind::from_type_tag("board-relation"), ColumnKind::BoardRelation);
        assert_eq!(
            ColumnKind::from_type_tag("date"),
            ColumnKind::Other("date".to_string())
        );
    }
}
