//! Whole-item retry.
//!
//! Workers retry a failed item as a unit (a short chunk fails the whole item);
//! this module holds the attempt policy, the attempt loop and the per-attempt
//! error type.

mod error;
mod policy;
mod run;

pub use error::TransferError;
pub use policy::{RetryDecision, RetryPolicy};
pub use run::{run_attempts, AttemptReport};
