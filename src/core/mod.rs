pub mod codec;
pub mod engine;
pub mod reconciler;
pub mod resolver;
pub mod workflow;

pub use crate::domain::model::{DuplicationOutcome, Item, OutcomeAction, PlannedAction, Preview};
pub use crate::domain::ports::{BoardClient, ConfirmationGate, ReportSink};
pub use crate::utils::error::Result;
