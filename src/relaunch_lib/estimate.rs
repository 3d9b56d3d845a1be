//! Accounting of the GPU-hours a launch will consume.

use crate::config::ScriptConfig;

/// The total accelerator-hours a script's full run set will consume.
///
/// `num_runs * num_nodes * gpus_per_node * num_minutes / 60`, with the final
/// division truncating. Pure; the orchestrator accumulates totals across
/// scripts.
pub fn gpu_hours(config: &ScriptConfig, gpus_per_node: u64) -> u64 {
    config.num_runs * config.num_nodes * gpus_per_node * config.num_minutes / 60
}

#[cfg(test)]
#[path = "tests/estimate.rs"]
mod tests;
