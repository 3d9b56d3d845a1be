use std::path::Path;
use std::process::Command;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use log::debug;
use relaunch_lib::ctx;

use crate::slurm::Scheduler;

/// An implementation of the [Scheduler] trait that submits via the CLI.
///
/// The continuation artifact contains the complete `sbatch --parsable`
/// invocation, so submitting is executing the artifact. This keeps the
/// original launch and any later human re-run byte-for-byte identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlurmCli;

impl Scheduler for SlurmCli {
    fn submit(&self, artifact: &Path) -> Result<String> {
        debug!("Executing the continuation artifact {artifact:?}");

        let proc = Command::new("bash")
            .arg(artifact)
            .output()
            .with_context(ctx!(
              "Failed to submit {artifact:?} to SLURM", ;
              "Ensure that you have permissions to submit jobs to the cluster",
            ))?;

        if !proc.status.success() {
            return Err(anyhow!("Submission failed")).with_context(ctx!(
                "Sbatch printed: {}", String::from_utf8_lossy(&proc.stderr);
                "Please ensure that you are running on slurm",
            ));
        }

        // sbatch --parsable prints only the job id.
        let job_id = String::from_utf8(proc.stdout)
            .with_context(ctx!("Could not read the sbatch output", ; "",))?
            .trim()
            .to_string();

        Ok(job_id)
    }
}
