//! Mapping resolution for one destination.
//!
//! Precedence, lowest to highest: template mappings, destination overrides,
//! additional mappings. A later stage replaces the destination of a source
//! column set by an earlier one. Resolution is a pure function of the
//! template set and the destination.

use crate::config::workflow_config::{Destination, Template};
use indexmap::IndexMap;

/// Final column map and display names for one destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMapping {
    /// Source column id -> destination column id, in first-declared order.
    pub columns: IndexMap<String, String>,
    /// Column id (source or destination) -> display name.
    pub names: IndexMap<String, String>,
}

impl ResolvedMapping {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Display name for a column id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, column_id: &'a str) -> &'a str {
        self.names
            .get(column_id)
            .map(String::as_str)
            .unwrap_or(column_id)
    }
}

/// An unknown template key resolves as if no template was referenced.
fn template_for<'a>(
    templates: &'a IndexMap<String, Template>,
    destination: &Destination,
) -> Option<&'a Template> {
    let key = destination.template.as_deref()?;
    let template = templates.get(key);
    if template.is_none() {
        tracing::warn!(
            "Destination '{}' references unknown template '{}', ignoring it",
            destination.board_name,
            key
        );
    }
    template
}

pub fn resolve_column_mappings(
    templates: &IndexMap<String, Template>,
    destination: &Destination,
) -> IndexMap<String, String> {
    let mut columns = IndexMap::new();

    if let Some(template) = template_for(templates, destination) {
        for mapping in &template.column_mappings {
            columns.insert(mapping.source.clone(), mapping.dest.clone());
        }
    }

    for (source, dest) in &destination.overrides {
        columns.insert(source.clone(), dest.clone());
    }

    for mapping in &destination.additional_mappings {
        columns.insert(mapping.source.clone(), mapping.dest.clone());
    }

    columns
}

/// Overrides only re-route columns, so they contribute no names.
pub fn resolve_column_names(
    templates: &IndexMap<String, Template>,
    destination: &Destination,
) -> IndexMap<String, String> {
    let mut names = IndexMap::new();

    if let Some(template) = template_for(templates, destination) {
        for mapping in &template.column_mappings {
            names.insert(mapping.source.clone(), mapping.name.clone());
            names.insert(mapping.dest.clone(), mapping.name.clone());
        }
    }

    for mapping in &destination.additional_mappings {
        let name = mapping.name.clone().unwrap_or_else(|| mapping.source.clone());
        names.insert(mapping.source.clone(), name.clone());
        names.insert(mapping.dest.clone(), name);
    }

    names
}

pub fn resolve(templates: &IndexMap<String, Template>, destination: &Destination) -> ResolvedMapping {
    ResolvedMapping {
        columns: resolve_column_mappings(templates, destination),
        names: resolve_column_names(templates, destination),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workflow_config::{AdditionalMapping, ColumnMapping};

    fn templates() -> IndexMap<String, Template> {
        let mut templates = IndexMap::new();
        templates.insert(
            "crm".to_string(),
            Template {
                description: "CRM".to_string(),
                column_mappings: vec![
                    ColumnMapping {
                        source: "a".to_string(),
                        dest: "b".to_string(),
                        name: "Alpha".to_string(),
                        column_type: "text".to_string(),
                    },
                    ColumnMapping {
                        source: "x".to_string(),
                        dest: "y".to_string(),
                        name: "Ex".to_string(),
                        column_type: "link".to_string(),
                    },
                ],
            },
        );
        templates
    }

    fn destination(template: Option<&str>) -> Destination {
        Destination {
            board_id: 2,
            group_id: "g".to_string(),
            board_name: "Dest".to_string(),
            template: template.map(str::to_string),
            overrides: IndexMap::new(),
            additional_mappings: Vec::new(),
        }
    }

    fn additional(source: &str, dest: &str, name: Option<&str>) -> AdditionalMapping {
        AdditionalMapping {
            source: source.to_string(),
            dest: dest.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_no_template_no_mappings_is_empty() {
        let resolved = resolve(&templates(), &destination(None));
        assert!(resolved.is_empty());
        assert!(resolved.names.is_empty());
    }

    #[test]
    fn test_template_seeds_columns_and_names() {
        let resolved = resolve(&templates(), &destination(Some("crm")));
        assert_eq!(resolved.columns.get("a").map(String::as_str), Some("b"));
        assert_eq!(resolved.columns.get("x").map(String::as_str), Some("y"));
        assert_eq!(resolved.display_name("a"), "Alpha");
        assert_eq!(resolved.display_name("b"), "Alpha");
        assert_eq!(resolved.display_name("unknown"), "unknown");
    }

    #[test]
    fn test_overrides_replace_template_targets() {
        let mut dest = destination(Some("crm"));
        dest.overrides.insert("a".to_string(), "c".to_string());

        let resolved = resolve(&templates(), &dest);
        assert_eq!(resolved.columns.get("a").map(String::as_str), Some("c"));
        // overridden key keeps its original position
        assert_eq!(resolved.columns.get_index_of("a"), Some(0));
        assert!(!resolved.names.contains_key("c"));
    }

    #[test]
    fn test_additional_mappings_take_final_precedence() {
        let mut dest = destination(Some("crm"));
        dest.overrides.insert("a".to_string(), "c".to_string());
        dest.additional_mappings.push(additional("a", "d", Some("Delta")));
        dest.additional_mappings.push(additional("n", "m", None));

        let resolved = resolve(&templates(), &dest);
        assert_eq!(resolved.columns.get("a").map(String::as_str), Some("d"));
        assert_eq!(resolved.display_name("a"), "Delta");
        assert_eq!(resolved.display_name("d"), "Delta");
        assert_eq!(resolved.display_name("m"), "n");
        assert_eq!(resolved.len(), 3);
    }

    #[test]
    fn test_unknown_template_is_treated_as_none() {
        let mut dest = destination(Some("missing"));
        dest.overrides.insert("s".to_string(), "t".to_string());

        let resolved = resolve(&templates(), &dest);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.columns.get("s").map(String::as_str), Some("t"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut dest = destination(Some("crm"));
        dest.overrides.insert("x".to_string(), "z".to_string());
        dest.additional_mappings.push(additional("q", "r", None));

        let templates = templates();
        assert_eq!(resolve(&templates, &dest), resolve(&templates, &dest));
    }
}
