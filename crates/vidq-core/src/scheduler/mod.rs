//! Queue manager: pending and running jobs under a concurrency cap.
//!
//! `Scheduler` owns all job state and is driven by `drive`, which ticks it,
//! feeds it the events job tasks send back and serves control commands.
//! Processes are started through a `Launcher`; output is rendered through a
//! `StatusSink`.

mod drive;
mod event;
mod launcher;
mod queue;

pub use drive::{drive, Command, DriveOptions, StatusSink};
pub use event::{JobEvent, RunReport};
pub use launcher::{Launcher, ToolLauncher};
pub use queue::{AbortOutcome, BatchSummary, Change, Scheduler, TickOutcome};
