//! Typed errors for run aggregation.

use crate::trace::PowerDirection;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RunError {
    #[error("actor {label:?} has no samples in the {} trace", .direction.role())]
    MissingActor {
        direction: PowerDirection,
        label: String,
    },
}
