use std::env;

use anyhow::Context;
use anyhow::Result;

use crate::bailc;
use crate::constants::ACCELERATORS_PER_NODE;

pub mod eval;
pub mod extract;

/// The field names recognized inside a launch configuration block.
///
/// These are the only names the expression evaluator will bind; assignments
/// to any other name are ignored.
pub const CONFIG_FIELDS: [&str; 5] = [
    "NUM_NODES",
    "STEPS_PER_RUN",
    "MAX_STEPS",
    "NUM_RUNS",
    "NUM_MINUTES",
];

/// The launch configuration declared in one script's header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptConfig {
    /// Nodes requested per job.
    pub num_nodes: u64,

    /// Training steps achievable within one job's time budget.
    pub steps_per_run: u64,

    /// Total steps the experiment must reach.
    pub max_steps: u64,

    /// Number of sequential job submissions.
    ///
    /// Caller-declared; conventionally `ceil_div(MAX_STEPS, STEPS_PER_RUN)`.
    pub num_runs: u64,

    /// Wall-clock budget per job, in minutes.
    pub num_minutes: u64,
}

impl ScriptConfig {
    /// Parse the configuration block embedded in a script's text.
    ///
    /// All five fields must be present and evaluate to positive integers;
    /// no defaults are synthesized.
    pub fn from_script(text: &str) -> Result<ScriptConfig> {
        let assignments = extract::assignment_lines(text)?;
        let bound = eval::bind(&assignments)?;

        let missing: Vec<&str> = CONFIG_FIELDS
            .iter()
            .filter(|name| !bound.contains_key(**name))
            .copied()
            .collect();

        if !missing.is_empty() {
            bailc!(
                "The launch configuration is incomplete", ;
                "Missing field(s): {}", missing.join(", ");
                "Declare every field between the config markers, for example `# NUM_NODES=2`",
            );
        }

        let field = |name: &str| -> Result<u64> {
            let value = bound[name];
            if value <= 0 {
                bailc!(
                    "Invalid value in the launch configuration", ;
                    "{name} evaluated to {value}, but it must be a positive integer", ;
                    "Check the expression assigned to {name} in the config block",
                );
            }
            Ok(value as u64)
        };

        Ok(ScriptConfig {
            num_nodes: field("NUM_NODES")?,
            steps_per_run: field("STEPS_PER_RUN")?,
            max_steps: field("MAX_STEPS")?,
            num_runs: field("NUM_RUNS")?,
            num_minutes: field("NUM_MINUTES")?,
        })
    }
}

/// How far a launch should go before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRun {
    /// Snapshot, build, and submit. The default.
    Submit,

    /// Report the GPU-hour estimate and stop; touch nothing.
    Estimate,

    /// Snapshot and build all continuation artifacts, but never submit.
    Prepare,
}

impl DryRun {
    /// Interpret the `DRYRUN` environment value.
    pub fn from_value(value: Option<&str>) -> Result<DryRun> {
        match value {
            None | Some("") | Some("0") => Ok(DryRun::Submit),
            Some("1") => Ok(DryRun::Estimate),
            Some("2") => Ok(DryRun::Prepare),
            Some(other) => {
                bailc!(
                    "Invalid dry-run level", ;
                    "DRYRUN was set to {:?}", other;
                    "Use 0 (submit), 1 (estimate only), or 2 (snapshot but do not submit)",
                );
            }
        }
    }
}

/// The process-wide launch inputs, gathered once at startup.
///
/// Read from the environment exactly once and passed explicitly to every
/// component afterwards; a missing mandatory variable fails construction
/// before any script is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// The container image reference jobs run inside.
    pub container: String,

    /// The account to charge for the jobs.
    pub account: String,

    /// The node partition to submit to.
    pub partition: String,

    /// Extra bind mounts, comma-joined after the snapshot directory.
    pub mounts: Option<String>,

    /// How far the launch should go.
    pub dry_run: DryRun,

    /// Whether release-tracking parameters are appended to the command.
    pub release: bool,

    /// Propagated `HF_HOME` cache directory.
    pub hf_home: String,

    /// Propagated `HF_DATASETS_CACHE` cache directory.
    pub hf_datasets_cache: String,

    /// Accelerators per allocated node.
    pub gpus_per_node: u64,
}

impl LaunchRequest {
    /// Build the request from the process environment.
    pub fn from_env() -> Result<LaunchRequest> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the request from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<LaunchRequest> {
        let mandatory = |name: &str| -> Result<String> {
            match lookup(name) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => {
                    bailc!(
                        "A mandatory environment variable is not set", ;
                        "{} must be set before launching", name;
                        "Export {} and run again", name,
                    );
                }
            }
        };

        let dry_run = DryRun::from_value(lookup("DRYRUN").as_deref())?;

        let release = match lookup("IS_RELEASE").as_deref() {
            None | Some("") | Some("0") => false,
            Some(_) => true,
        };

        Ok(LaunchRequest {
            container: mandatory("CONTAINER")?,
            account: mandatory("ACCOUNT")?,
            partition: mandatory("PARTITION")?,
            mounts: lookup("MOUNTS").filter(|m| !m.is_empty()),
            dry_run,
            release,
            hf_home: mandatory("HF_HOME")?,
            hf_datasets_cache: mandatory("HF_DATASETS_CACHE")?,
            gpus_per_node: ACCELERATORS_PER_NODE,
        })
    }
}
