//! CLI command handlers, one file per subcommand.

mod abort;
mod add;
mod completions;
mod history;
mod remove;
mod retry;
mod run;
mod status;

pub use abort::run_abort;
pub use add::{run_add, AddArgs};
pub use completions::run_completions;
pub use history::run_history;
pub use remove::run_remove;
pub use retry::run_retry;
pub use run::run_scheduler;
pub use status::run_status;
