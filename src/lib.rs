pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::gate::{AutoApprove, AutoDecline};
pub use adapters::monday::MondayClient;
pub use config::workflow_config::WorkflowConfig;
pub use crate::core::{engine::DuplicationEngine, workflow::WorkflowRunner};
pub use utils::error::{DuplicatorError, Result};
