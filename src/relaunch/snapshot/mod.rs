use std::path::PathBuf;
use std::process::Command;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use log::debug;
use relaunch_lib::bailc;
use relaunch_lib::constants::SNAPSHOT_COMMAND;
use relaunch_lib::ctx;

/// The interface to the snapshot collaborator.
///
/// A snapshot is an immutable, addressable copy of the codebase, requested
/// once per script (not once per run); all continuation artifacts for that
/// script are written into it. A failed snapshot is fatal for the launch:
/// falling back to an un-snapshotted launch would break reproducibility.
pub trait SnapshotProvider {
    /// Obtain the snapshot directory for one experiment.
    fn request_snapshot(&self, experiment_name: &str) -> Result<PathBuf>;
}

/// The production provider, shelling out to the external snapshot tool.
#[derive(Debug, Clone)]
pub struct SnapshotCli {
    /// The snapshot executable to invoke.
    pub command: String,
}

impl Default for SnapshotCli {
    fn default() -> Self {
        Self {
            command: SNAPSHOT_COMMAND.to_string(),
        }
    }
}

impl SnapshotProvider for SnapshotCli {
    /// Run the snapshot tool; it prints the snapshot directory on stdout.
    fn request_snapshot(&self, experiment_name: &str) -> Result<PathBuf> {
        debug!("Requesting a code snapshot for {experiment_name}");

        let proc = Command::new(&self.command)
            .arg(experiment_name)
            .output()
            .with_context(ctx!(
              "Failed to run the snapshot tool `{}`", self.command;
              "Ensure that it is installed and in your PATH",
            ))?;

        if !proc.status.success() {
            return Err(anyhow!("Snapshot failed")).with_context(ctx!(
                "The snapshot tool printed: {}", String::from_utf8_lossy(&proc.stderr);
                "The launch cannot continue without an immutable code copy",
            ));
        }

        let dir = PathBuf::from(String::from_utf8(proc.stdout)?.trim());

        if !dir.is_dir() {
            bailc!(
                "Snapshot failed", ;
                "The snapshot tool reported {dir:?}, which is not a directory", ;
                "",
            );
        }

        debug!("Snapshot for {experiment_name} at {dir:?}");

        Ok(dir)
    }
}
