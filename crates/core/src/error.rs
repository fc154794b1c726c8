use std::fmt;
use std::time::Duration;

/// Reason attached to [`BridgeError::IllegalState`] when asking after the end signal.
pub const DIALOGUE_ENDED: &str = "dialogue has ended";

/// What a timed-out call was waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    /// The interviewer was waiting for the founder's answer.
    Answer,
    /// The voice agent was waiting for the next question.
    Question,
    /// The interviewer was waiting for an earlier question to be answered before
    /// its own could be enqueued.
    Turn,
}

impl fmt::Display for WaitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitTarget::Answer => f.write_str("an answer"),
            WaitTarget::Question => f.write_str("the next question"),
            WaitTarget::Turn => f.write_str("its turn to ask"),
        }
    }
}

/// Errors surfaced by session operations.
///
/// None of these are retried internally; the caller decides whether silence means
/// "ask again", "move on", or "hang up".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("timed out after {waited:?} waiting for {waiting_for}")]
    Timeout {
        waited: Duration,
        waiting_for: WaitTarget,
    },
    #[error("illegal state: {0}")]
    IllegalState(&'static str),
    #[error("session channel disconnected")]
    Disconnected,
}

impl BridgeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, BridgeError::IllegalState(_))
    }
}
