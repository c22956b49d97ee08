//! Domain error types

use thiserror::Error;

/// Invariant violations raised by the interview state itself. Fatal to the
/// call, never to the process.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Feedback already generated for this session")]
    FeedbackAlreadyGenerated,

    #[error("A turn is already open; the previous candidate message was not processed")]
    TurnAlreadyOpen,
}
