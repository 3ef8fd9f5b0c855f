use std::fmt;
use tokio::sync::watch;
use tracing::info;

/// Lifecycle of a subscription.
///
/// `Idle -> Connecting -> Streaming -> {Completed, Failed, Cancelled}`.
/// Cancellation is possible from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    #[default]
    Idle,
    /// Change feed request sent, no bytes received yet
    Connecting,
    /// At least one byte of the change feed received
    Streaming,
    /// The server closed the change feed cleanly
    Completed,
    /// The change feed failed; the error was delivered to the consumer
    Failed,
    /// Cancelled by the consumer
    Cancelled,
}

impl SubscriptionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubscriptionState::Completed | SubscriptionState::Failed | SubscriptionState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Idle => "idle",
            SubscriptionState::Connecting => "connecting",
            SubscriptionState::Streaming => "streaming",
            SubscriptionState::Completed => "completed",
            SubscriptionState::Failed => "failed",
            SubscriptionState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move to `next` unless the current state is terminal or already `next`.
///
/// Returns whether the state changed.
pub(crate) fn transition(state: &watch::Sender<SubscriptionState>, next: SubscriptionState) -> bool {
    state.send_if_modified(|current| {
        if current.is_terminal() || *current == next {
            return false;
        }
        info!("Subscription {} -> {}", current, next);
        *current = next;
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SubscriptionState::Idle.is_terminal());
        assert!(!SubscriptionState::Connecting.is_terminal());
        assert!(!SubscriptionState::Streaming.is_terminal());
        assert!(SubscriptionState::Completed.is_terminal());
        assert!(SubscriptionState::Failed.is_terminal());
        assert!(SubscriptionState::Cancelled.is_terminal());
    }

    #[test]
    fn test_transition_sequence() {
        let (tx, rx) = watch::channel(SubscriptionState::Idle);
        assert!(transition(&tx, SubscriptionState::Connecting));
        assert!(transition(&tx, SubscriptionState::Streaming));
        assert!(!transition(&tx, SubscriptionState::Streaming));
        assert!(transition(&tx, SubscriptionState::Completed));
        assert_eq!(*rx.borrow(), SubscriptionState::Completed);
    }

    #[test]
    fn test_terminal_state_is_final() {
        let (tx, rx) = watch::channel(SubscriptionState::Streaming);
        assert!(transition(&tx, SubscriptionState::Cancelled));
        assert!(!transition(&tx, SubscriptionState::Failed));
        assert!(!transition(&tx, SubscriptionState::Completed));
        assert_eq!(*rx.borrow(), SubscriptionState::Cancelled);
    }

    #[test]
    fn test_display() {
        assert_eq!(SubscriptionState::Streaming.to_string(), "streaming");
    }
}
