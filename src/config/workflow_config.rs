use crate::core::resolver::{self, ResolvedMapping};
use crate::utils::error::{DuplicatorError, Result};
use crate::utils::validation::{
    validate_board_id, validate_non_empty_string, validate_unique, Validate,
};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/workflows.json";

/// The whole workflow document: shared templates plus the workflows using them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub templates: IndexMap<String, Template>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub dest: String,
    pub name: String,
    #[serde(rename = "type", default = "default_column_type")]
    pub column_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(deserialize_with = "deserialize_board_id")]
    pub board_id: u64,
    pub group_id: String,
    #[serde(default = "default_source_board_name")]
    pub board_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(deserialize_with = "deserialize_board_id")]
    pub board_id: u64,
    pub group_id: String,
    #[serde(default = "default_destination_board_name")]
    pub board_name: String,
    #[serde(default)]
    pub template: Option<String>,
    /// Source column id -> destination column id.
    #[serde(default)]
    pub overrides: IndexMap<String, String>,
    #[serde(default)]
    pub additional_mappings: Vec<AdditionalMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalMapping {
    pub source: String,
    pub dest: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub source: Source,
    pub destinations: Vec<Destination>,
}

/// Flat listing row used by `--list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub source_board: String,
    pub destinations: Vec<String>,
}

fn default_column_type() -> String {
    "text".to_string()
}

fn default_source_board_name() -> String {
    "Source Board".to_string()
}

fn default_destination_board_name() -> String {
    "Destination Board".to_string()
}

fn default_enabled() -> bool {
    true
}

/// Board ids show up both as JSON numbers and as numeric strings.
fn deserialize_board_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBoardId {
        Number(u64),
        Text(String),
    }

    match RawBoardId::deserialize(deserializer)? {
        RawBoardId::Number(id) => Ok(id),
        RawBoardId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid board id '{}'", text))),
    }
}

impl WorkflowConfig {
    /// Loads the document, picking TOML for `.toml` files and JSON otherwise.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DuplicatorError::ConfigNotFoundError {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(DuplicatorError::IoError)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        serde_json::from_str(&processed_content).map_err(|e| DuplicatorError::ConfigError {
            message: format!("JSON parsing error: {}", e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DuplicatorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn get_workflow(&self, workflow_id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.id == workflow_id)
    }

    pub fn enabled_workflows(&self) -> Vec<&Workflow> {
        self.workflows.iter().filter(|w| w.enabled).collect()
    }

    /// Looks up a workflow that is allowed to run.
    pub fn require_enabled_workflow(&self, workflow_id: &str) -> Result<&Workflow> {
        let workflow =
            self.get_workflow(workflow_id)
                .ok_or_else(|| DuplicatorError::WorkflowNotFoundError {
                    id: workflow_id.to_string(),
                })?;
        if !workflow.enabled {
            return Err(DuplicatorError::WorkflowDisabledError {
                id: workflow_id.to_string(),
            });
        }
        Ok(workflow)
    }

    pub fn list_workflows(&self) -> Vec<WorkflowSummary> {
        self.workflows
            .iter()
            .map(|w| WorkflowSummary {
                id: w.id.clone(),
                name: w.name.clone(),
                enabled: w.enabled,
                source_board: w.source.board_name.clone(),
                destinations: w.destinations.iter().map(|d| d.board_name.clone()).collect(),
            })
            .collect()
    }

    pub fn resolve(&self, destination: &Destination) -> ResolvedMapping {
        resolver::resolve(&self.templates, destination)
    }

    pub fn resolve_column_mappings(&self, destination: &Destination) -> IndexMap<String, String> {
        resolver::resolve_column_mappings(&self.templates, destination)
    }

    pub fn resolve_column_names(&self, destination: &Destination) -> IndexMap<String, String> {
        resolver::resolve_column_names(&self.templates, destination)
    }

    fn validate_templates(&self) -> Result<()> {
        for (template_id, template) in &self.templates {
            for (index, mapping) in template.column_mappings.iter().enumerate() {
                let prefix = format!("templates.{}.column_mappings[{}]", template_id, index);
                validate_non_empty_string(&format!("{}.source", prefix), &mapping.source)?;
                validate_non_empty_string(&format!("{}.dest", prefix), &mapping.dest)?;
            }
        }
        Ok(())
    }

    fn validate_workflow(&self, workflow: &Workflow) -> Result<()> {
        validate_non_empty_string("workflows.id", &workflow.id)?;
        let prefix = format!("workflows.{}", workflow.id);
        validate_non_empty_string(&format!("{}.name", prefix), &workflow.name)?;
        validate_board_id(&format!("{}.source.board_id", prefix), workflow.source.board_id)?;
        validate_non_empty_string(&format!("{}.source.group_id", prefix), &workflow.source.group_id)?;

        if workflow.destinations.is_empty() {
            return Err(DuplicatorError::MissingConfigError {
                field: format!("{}.destinations", prefix),
            });
        }

        for (index, destination) in workflow.destinations.iter().enumerate() {
            let dest_prefix = format!("{}.destinations[{}]", prefix, index);
            validate_board_id(&format!("{}.board_id", dest_prefix), destination.board_id)?;
            validate_non_empty_string(&format!("{}.group_id", dest_prefix), &destination.group_id)?;

            if let Some(template) = &destination.template {
                if !self.templates.contains_key(template) {
                    return Err(DuplicatorError::UnknownTemplateError {
                        destination: destination.board_name.clone(),
                        template: template.clone(),
                    });
                }
            }

            for (source, dest) in &destination.overrides {
                validate_non_empty_string(&format!("{}.overrides", dest_prefix), source)?;
                validate_non_empty_string(&format!("{}.overrides.{}", dest_prefix, source), dest)?;
            }
            for mapping in &destination.additional_mappings {
                let field = format!("{}.additional_mappings", dest_prefix);
                validate_non_empty_string(&field, &mapping.source)?;
                validate_non_empty_string(&field, &mapping.dest)?;
            }
        }

        Ok(())
    }
}

impl Validate for WorkflowConfig {
    fn validate(&self) -> Result<()> {
        self.validate_templates()?;
        validate_unique("workflows.id", self.workflows.iter().map(|w| w.id.as_str()))?;
        for workflow in &self.workflows {
            self.validate_workflow(workflow)?;
        }
        Ok(())
    }
}
