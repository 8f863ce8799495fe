//! Confirmation before persisting
//!
//! The pipeline asks the gate first and only then calls the store, so the
//! decision and the write can be tested separately. Declining is not an
//! error; the pipeline reports [`crate::UpdateOutcome::Aborted`].

use crate::error::Result;

/// Decides whether a pending change may be persisted
pub trait ConfirmationGate: Send + Sync {
    /// `description` names the action and its target, e.g.
    /// "set express route gateway 'gw1' in resource group 'rg1'"
    fn should_proceed(&self, description: &str) -> Result<bool>;
}

/// Always proceeds. Used for `--force`, automation and background jobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceConfirmation;

impl ConfirmationGate for ForceConfirmation {
    fn should_proceed(&self, _description: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Plain closures work as gates, which keeps callers and tests short
impl<F> ConfirmationGate for F
where
    F: Fn(&str) -> Result<bool> + Send + Sync,
{
    fn should_proceed(&self, description: &str) -> Result<bool> {
        self(description)
    }
}
