//! Fatal escalation for errors the runtime cannot continue past

use serde::{Deserialize, Serialize};

/// What to do when a fatal dispatch error is hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatalAction {
    /// Log and abort the process
    #[default]
    Abort,
    /// Log and panic (embedders that isolate the runtime on a thread, tests)
    Panic,
}

/// Log `error` and stop according to `action`. Never returns.
#[cold]
pub fn escalate(action: FatalAction, error: &dyn std::error::Error) -> ! {
    log::error!("fatal icall error: {}", error);
    match action {
        FatalAction::Abort => {
            eprintln!("fatal icall error: {}", error);
            std::process::abort()
        }
        FatalAction::Panic => panic!("fatal icall error: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotFound;

    #[test]
    #[should_panic(expected = "icall token 150 is not in the table")]
    fn test_escalate_panic_names_token() {
        escalate(FatalAction::Panic, &NotFound { token: 150 });
    }

    #[test]
    fn test_default_is_abort() {
        assert_eq!(FatalAction::default(), FatalAction::Abort);
    }
}
