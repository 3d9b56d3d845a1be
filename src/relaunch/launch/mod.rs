use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use log::debug;
use log::info;
use relaunch_lib::bailc;
use relaunch_lib::config::DryRun;
use relaunch_lib::config::LaunchRequest;
use relaunch_lib::config::ScriptConfig;
use relaunch_lib::ctx;
use relaunch_lib::estimate::gpu_hours;
use relaunch_lib::file_system::FileOperations;

use crate::cli::printing::format_table;
use crate::continuation;
use crate::provenance::Provenance;
use crate::slurm::Scheduler;
use crate::snapshot::SnapshotProvider;

/// The launch pipeline, generic over its two external collaborators.
#[derive(Debug, Clone, Copy)]
pub struct LaunchPipeline<S, Q>
where
    S: SnapshotProvider,
    Q: Scheduler,
{
    /// The snapshot collaborator.
    pub snapshots: S,

    /// The scheduler-submit collaborator.
    pub scheduler: Q,
}

impl<S, Q> LaunchPipeline<S, Q>
where
    S: SnapshotProvider,
    Q: Scheduler,
{
    /// Launch every script, in input order, and report the estimates.
    ///
    /// Fail-fast: any failure aborts the remaining scripts immediately, so
    /// a batch launch can never end up with silent gaps where an earlier
    /// script's setup failed but a later script's jobs were submitted.
    ///
    /// ### Returns
    /// The total estimated GPU-hours across all processed scripts.
    pub fn launch_all(
        &self,
        request: &LaunchRequest,
        scripts: &[PathBuf],
        launched_at: &str,
        fs: &impl FileOperations,
    ) -> Result<u64> {
        let mut total = 0;
        let mut rows = vec![vec![
            "script".to_string(),
            "runs".to_string(),
            "nodes".to_string(),
            "minutes".to_string(),
            "gpu hours".to_string(),
        ]];

        for script in scripts {
            let (config, hours) = self.launch_script(request, script, launched_at, fs)?;

            total += hours;
            rows.push(vec![
                script.display().to_string(),
                config.num_runs.to_string(),
                config.num_nodes.to_string(),
                config.num_minutes.to_string(),
                hours.to_string(),
            ]);
        }

        info!("\n{}", format_table(rows));

        Ok(total)
    }

    /// Run the launch state machine for one script.
    fn launch_script(
        &self,
        request: &LaunchRequest,
        script: &Path,
        launched_at: &str,
        fs: &impl FileOperations,
    ) -> Result<(ScriptConfig, u64)> {
        if !script.exists() {
            bailc!(
                "Script not found", ;
                "{script:?} does not exist", ;
                "Check the path passed on the command line",
            );
        }

        let text = fs.read_utf8(script)?;
        let config = ScriptConfig::from_script(&text).with_context(ctx!(
          "In the script {script:?}", ;
          "",
        ))?;

        let hours = gpu_hours(&config, request.gpus_per_node);
        info!(
            "{script:?}: {} runs x {} nodes x {} minutes = {hours} GPU hours",
            config.num_runs, config.num_nodes, config.num_minutes
        );

        if request.dry_run == DryRun::Estimate {
            return Ok((config, hours));
        }

        let provenance = Provenance::verify(script)?;
        debug!(
            "{script:?} is tracked as {:?} at revision {}",
            provenance.rel_path, provenance.short_rev
        );

        // One snapshot per script; all of its runs share it.
        let experiment_name = format!("{}_{launched_at}", provenance.job_name());
        let snapshot_dir = self.snapshots.request_snapshot(&experiment_name)?;

        for run in 0..config.num_runs {
            let artifact = continuation::build(
                &config,
                run,
                config.num_runs,
                request,
                &snapshot_dir,
                &provenance,
                launched_at,
            );
            artifact.persist(fs)?;

            if request.dry_run == DryRun::Prepare {
                info!(
                    "Prepared run {} of {}: {:?} (not submitted)",
                    run + 1,
                    config.num_runs,
                    artifact.path
                );
            } else {
                let job_id = self.scheduler.submit(&artifact.path)?;
                info!("Submitted run {} of {}: job {job_id}", run + 1, config.num_runs);
            }
        }

        if request.dry_run == DryRun::Prepare {
            info!("Snapshot ready at {snapshot_dir:?}; submit later by running the continuation scripts");
        }

        Ok((config, hours))
    }
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
