//! Persistent job store (SQLite via sqlx).
//!
//! Holds every job record: queued jobs waiting for a `vidq run`, the live
//! status of running jobs, and the history of finished ones.

mod db;
mod jobs;
mod row;

pub use db::{unix_timestamp, JobStore};

#[cfg(test)]
pub(crate) use db::open_memory;
