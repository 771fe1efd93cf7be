//! One-time feedback prompt
//!
//! The modal is offered once per profile, the moment the collection reaches
//! exactly five prompts.

use std::time::Duration;

use crate::{
    db::{SharedStore, FEEDBACK_SHOWN_KEY},
    errors::{PromptPortError, Result},
};

/// Collection size that triggers the prompt
pub const FEEDBACK_TRIGGER_COUNT: usize = 5;

pub struct FeedbackGate {
    store: SharedStore,
    delay: Duration,
}

impl FeedbackGate {
    pub fn new(store: SharedStore, delay: Duration) -> Self {
        Self { store, delay }
    }

    pub fn already_shown(&self) -> bool {
        match self.store.get(FEEDBACK_SHOWN_KEY) {
            Ok(flag) => flag.is_some(),
            Err(e) => {
                log::warn!("Failed to read feedback flag: {}", e);
                false
            },
        }
    }

    /// Returns the delay after which to show the modal, or `None`
    ///
    /// Fires only when `prompt_count` is exactly the trigger count and the
    /// prompt was never shown; the flag is set before returning.
    pub fn check_for_prompt(&self, prompt_count: usize) -> Result<Option<Duration>> {
        if prompt_count != FEEDBACK_TRIGGER_COUNT || self.already_shown() {
            return Ok(None);
        }

        self.store
            .set(FEEDBACK_SHOWN_KEY, "true")
            .map_err(|e| PromptPortError::Storage(e.to_string()))?;
        Ok(Some(self.delay))
    }
}
