use crate::domain::model::Preview;
use crate::domain::ports::ConfirmationGate;
use crate::utils::error::Result;

/// Approves every write. Used for `--yes` and unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm(&self, preview: &Preview) -> Result<bool> {
        tracing::debug!(
            "Auto-approving {} of '{}'",
            preview.action_label(),
            preview.item_name
        );
        Ok(true)
    }
}

/// Declines every write; useful as a dry run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl ConfirmationGate for AutoDecline {
    fn confirm(&self, preview: &Preview) -> Result<bool> {
        tracing::debug!(
            "Declining {} of '{}'",
            preview.action_label(),
            preview.item_name
        );
        Ok(false)
    }
}

#[cfg(feature = "cli")]
pub use interactive::{parse_answer, Answer, InteractiveGate};

#[cfg(feature = "cli")]
mod interactive {
    use super::*;
    use crate::utils::error::DuplicatorError;
    use dialoguer::Input;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Answer {
        Yes,
        No,
        /// Approve this and every remaining item.
        All,
        Quit,
    }

    /// Empty or unrecognised input counts as "no".
    pub fn parse_answer(input: &str) -> Answer {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Answer::Yes,
            "a" | "all" => Answer::All,
            "q" | "quit" | "exit" => Answer::Quit,
            _ => Answer::No,
        }
    }

    /// Asks on the terminal before each write.
    #[derive(Debug, Default)]
    pub struct InteractiveGate {
        approve_all: AtomicBool,
    }

    impl InteractiveGate {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl ConfirmationGate for InteractiveGate {
        fn confirm(&self, preview: &Preview) -> Result<bool> {
            if self.approve_all.load(Ordering::SeqCst) {
                return Ok(true);
            }

            let action = preview.action_label().to_lowercase();
            println!(
                "\n⚠️  Ready to {} '{}' in {}.",
                preview.action_label(),
                preview.item_name,
                preview.dest_board_name
            );
            let input: String = Input::new()
                .with_prompt(format!("   Continue with {}? [y/n/a/q] (yes/no/all/quit)", action))
                .allow_empty(true)
                .interact_text()
                .map_err(|e| DuplicatorError::IoError(std::io::Error::other(e)))?;

            match parse_answer(&input) {
                Answer::Yes => Ok(true),
                Answer::All => {
                    self.approve_all.store(true, Ordering::SeqCst);
                    Ok(true)
                }
                Answer::No => {
                    println!("❌ {} cancelled by user.", preview.action_label());
                    Ok(false)
                }
                Answer::Quit => Err(DuplicatorError::UserAbortError),
            }
        }
    }
}
