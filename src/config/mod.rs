#[cfg(feature = "cli")]
pub mod cli;
pub mod workflow_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use workflow_config::WorkflowConfig;
