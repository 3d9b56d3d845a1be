use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use relaunch_lib::config::LaunchRequest;
use relaunch_lib::config::ScriptConfig;
use relaunch_lib::constants::INSTALL_STEP;
use relaunch_lib::constants::RELEASE_PROJECT;
use relaunch_lib::file_system::FileOperations;

use crate::provenance::Provenance;

/// One fully self-contained submission descriptor.
///
/// The rendered script exports the environment a re-run needs and performs
/// a single `sbatch --parsable` call; it is executable on its own, with no
/// dependency on the tool or environment that generated it. Building is
/// deterministic given identical inputs, so regenerating an artifact is
/// always safe and overwrites silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationArtifact {
    /// Where the artifact lives, inside the snapshot directory.
    pub path: PathBuf,

    /// The rendered script.
    pub contents: String,
}

impl ContinuationArtifact {
    /// Write the artifact into the snapshot directory as an executable file.
    pub fn persist(&self, fs: &impl FileOperations) -> Result<()> {
        fs.write_utf8_truncate(&self.path, &self.contents)?;
        fs.set_permissions(&self.path, 0o755)
    }
}

/// Render the continuation artifact for one (script, run) pair.
///
/// `run` is zero-based; human-facing names use `run + 1` of `total_runs`.
/// The launch timestamp is an input rather than read from the clock, which
/// is what makes the builder deterministic.
pub fn build(
    config: &ScriptConfig,
    run: u64,
    total_runs: u64,
    request: &LaunchRequest,
    snapshot_dir: &Path,
    provenance: &Provenance,
    launched_at: &str,
) -> ContinuationArtifact {
    let job_name = provenance.job_name();
    let snapshot = snapshot_dir.display();

    let mounts = match &request.mounts {
        Some(extra) => format!("{snapshot},{extra}"),
        None => format!("{snapshot}"),
    };

    // Timestamp, job id, job name, and run position together make output
    // files collision-free across sequential and concurrent runs.
    let output_pattern = format!(
        "{snapshot}/logs/{launched_at}_%j_{job_name}_run{}-of-{total_runs}.out",
        run + 1
    );

    let release_args = if request.release {
        format!(
            " --project {RELEASE_PROJECT} --run-name {job_name}-{}",
            provenance.short_rev
        )
    } else {
        String::new()
    };

    let command = format!(
        "cd {snapshot} && {INSTALL_STEP} && bash {}{release_args}",
        provenance.rel_path.display()
    );

    let contents = format!(
        "#!/bin/bash
# Continuation for run {run_human} of {total_runs} of {rel_path}.
# Generated at {launched_at}; re-running this file resubmits the same job
# against the same code snapshot.

export HF_HOME=\"{hf_home}\"
export HF_DATASETS_CACHE=\"{hf_datasets_cache}\"

sbatch --parsable \\
    --job-name=\"{job_name}\" \\
    --nodes={num_nodes} \\
    --ntasks-per-node=1 \\
    --gres=\"gpu:{gpus_per_node}\" \\
    --account=\"{account}\" \\
    --partition=\"{partition}\" \\
    --time=\"{time_limit}\" \\
    --output=\"{output_pattern}\" \\
    --wrap=\"srun --container-image='{container}' --container-mounts='{mounts}' bash -c '{command}'\"
",
        run_human = run + 1,
        rel_path = provenance.rel_path.display(),
        hf_home = request.hf_home,
        hf_datasets_cache = request.hf_datasets_cache,
        num_nodes = config.num_nodes,
        gpus_per_node = request.gpus_per_node,
        account = request.account,
        partition = request.partition,
        time_limit = time_limit(config.num_minutes),
        container = request.container,
    );

    let path = snapshot_dir.join(format!(
        "continue_{job_name}_run{:02}-of-{total_runs:02}.sh",
        run + 1
    ));

    ContinuationArtifact { path, contents }
}

/// Render the per-job time limit.
///
/// The hours field is pinned to zero and the whole budget is expressed in
/// minutes, as the original launcher renders it. Slurm accepts minute
/// values of 60 and above, so multi-hour jobs still work, but the rendered
/// hours field itself never moves off zero. Known limitation, kept for
/// compatibility with artifacts generated before this tool.
fn time_limit(num_minutes: u64) -> String {
    format!("0:{num_minutes:02}:00")
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
