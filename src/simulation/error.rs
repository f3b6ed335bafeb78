//! Engine error type.

use thiserror::Error;

use super::types::Approach;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("invalid vehicle: {0}")]
    InvalidVehicle(String),

    /// Only the approach at the head of the activation queue may release it.
    #[error("activation queue released by {got}, but the head is {expected:?}")]
    ArbiterOrder {
        expected: Option<Approach>,
        got: Approach,
    },
}

pub type SimResult<T> = Result<T, SimError>;
