use std::path::Path;

use anyhow::Result;

/// Currently used implementation of interacting with SLURM through the CLI
pub mod interactor;

/// The interface for submitting jobs to a SLURM cluster.
///
/// Submission is fire-and-forget: one synchronous call per run, returning
/// the scheduler job id. The scheduler independently sequences or
/// parallelizes the actual compute; nothing here waits for jobs to finish.
pub trait Scheduler {
    /// Submit one continuation artifact, returning the job id.
    fn submit(&self, artifact: &Path) -> Result<String>;
}
