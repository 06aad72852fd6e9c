//! The job record: one requested download or local conversion.
//!
//! A `Job` is created from a user-supplied `JobRequest`, lives in the
//! scheduler's pending list, runs, and ends up in the job store once it
//! reaches a terminal status.

mod record;
mod types;
mod validate;

pub use record::*;
pub(crate) use record::expected_extension_for;
pub use types::*;
pub use validate::validate_request;
