//! Lifecycle of a single dispatch to the completion service.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Phase of one request/reply exchange.
///
/// ```text
/// Idle ──► Awaiting ──► AppendedSuccess ──► Idle
///                  └──► AppendedFailure ──► Idle
/// ```
///
/// There is no cancellation edge: once awaiting, a dispatch always settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    Idle,
    Awaiting,
    AppendedSuccess,
    AppendedFailure,
}

impl StateMachine for DispatchPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DispatchPhase::*;
        matches!(
            (self, target),
            (Idle, Awaiting)
                | (Awaiting, AppendedSuccess)
                | (Awaiting, AppendedFailure)
                | (AppendedSuccess, Idle)
                | (AppendedFailure, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DispatchPhase::*;
        match self {
            Idle => vec![Awaiting],
            Awaiting => vec![AppendedSuccess, AppendedFailure],
            AppendedSuccess | AppendedFailure => vec![Idle],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_path_is_valid() {
        let phase = DispatchPhase::Idle
            .transition_to(DispatchPhase::Awaiting)
            .and_then(|p| p.transition_to(DispatchPhase::AppendedSuccess))
            .and_then(|p| p.transition_to(DispatchPhase::Idle));
        assert_eq!(phase, Ok(DispatchPhase::Idle));
    }

    #[test]
    fn failure_path_is_valid() {
        let phase = DispatchPhase::Idle
            .transition_to(DispatchPhase::Awaiting)
            .and_then(|p| p.transition_to(DispatchPhase::AppendedFailure));
        assert_eq!(phase, Ok(DispatchPhase::AppendedFailure));
    }

    #[test]
    fn cannot_skip_awaiting() {
        assert!(DispatchPhase::Idle
            .transition_to(DispatchPhase::AppendedSuccess)
            .is_err());
    }

    #[test]
    fn awaiting_cannot_return_to_idle_without_settling() {
        assert!(DispatchPhase::Awaiting
            .transition_to(DispatchPhase::Idle)
            .is_err());
    }

    #[test]
    fn no_phase_is_terminal() {
        for phase in [
            DispatchPhase::Idle,
            DispatchPhase::Awaiting,
            DispatchPhase::AppendedSuccess,
            DispatchPhase::AppendedFailure,
        ] {
            assert!(!phase.is_terminal());
        }
    }
}
