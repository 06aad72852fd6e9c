//! CLI for the vidq download and conversion queue.

mod commands;
mod control_socket;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use vidq_core::config;
use vidq_core::job::{JobId, Source};
use vidq_core::store::JobStore;

use commands::{
    run_abort, run_add, run_completions, run_history, run_remove, run_retry, run_scheduler,
    run_status, AddArgs,
};

/// Top-level CLI for vidq.
#[derive(Debug, Parser)]
#[command(name = "vidq")]
#[command(about = "vidq: queue of video downloads and local conversions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where a new job's input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Main video site (quality selects the format).
    Primary,
    /// Alternate provider; may need a referer.
    Alt,
    /// A file on disk, converted with the transcoding tool.
    Local,
}

impl From<SourceArg> for Source {
    fn from(s: SourceArg) -> Self {
        match s {
            SourceArg::Primary => Source::PrimaryRemote,
            SourceArg::Alt => Source::AltRemote,
            SourceArg::Local => Source::LocalFile,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Queue a download (URL) or a local conversion (file path).
    Add {
        /// Video URL, or a file path with `--source local`.
        locator: String,
        #[arg(long, value_enum, default_value = "primary")]
        source: SourceArg,
        /// Referer header sent by the alt provider.
        #[arg(long, value_name = "URL")]
        referer: Option<String>,
        /// Quality preset, e.g. "1080p", "720p (video only)", "High Quality MP4", "Same as source".
        #[arg(long, short = 'q')]
        quality: Option<String>,
        /// Extract audio to mp3 (remote sources only).
        #[arg(long)]
        audio_only: bool,
        /// Output file name without extension (skips the title lookup).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Run the scheduler until the queue is empty.
    Run {
        /// Maximum concurrent jobs (default: max_concurrent from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Keep running and wait for jobs added while idle; stop with Ctrl-C.
        #[arg(long)]
        watch: bool,
    },

    /// Show queued, title-pending and active jobs.
    Status {
        /// Include finished jobs.
        #[arg(long)]
        all: bool,
    },

    /// Show finished jobs, newest first.
    History {
        /// Delete all finished records instead.
        #[arg(long)]
        clear: bool,
    },

    /// Abort a queued or running job by its ID.
    Abort {
        /// Job identifier.
        id: JobId,
    },

    /// Re-queue a failed or aborted job by its ID.
    Retry {
        /// Job identifier.
        id: JobId,
    },

    /// Remove a job record by ID.
    Remove {
        /// Job identifier.
        id: JobId,
        /// Also delete the file the job produced.
        #[arg(long)]
        delete_file: bool,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            return run_completions(shell);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let store = JobStore::open_default().await?;

        match cli.command {
            CliCommand::Add {
                locator,
                source,
                referer,
                quality,
                audio_only,
                name,
            } => {
                let args = AddArgs {
                    locator,
                    source: source.into(),
                    referer,
                    quality,
                    audio_only,
                    name,
                };
                run_add(&store, &cfg, args).await?
            }
            CliCommand::Run { jobs, watch } => run_scheduler(&store, &cfg, jobs, watch).await?,
            CliCommand::Status { all } => run_status(&store, all).await?,
            CliCommand::History { clear } => run_history(&store, clear).await?,
            CliCommand::Abort { id } => run_abort(&store, id).await?,
            CliCommand::Retry { id } => run_retry(&store, id).await?,
            CliCommand::Remove { id, delete_file } => run_remove(&store, id, delete_file).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
