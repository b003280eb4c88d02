//! Service classification.
//!
//! Each departure gets a slowness penalty (the highest penalty among the
//! stations it calls at) and a visibility flag from the configured filters.

mod classifier;
mod penalty;

pub use classifier::{
    Annotated, CallingFilter, DepartureFilter, ServiceAnnotator, ServiceClassifier,
};
pub use penalty::{Penalty, PenaltyError, PenaltyMode, PenaltyTable};
