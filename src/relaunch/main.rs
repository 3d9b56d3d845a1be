//! Relaunch turns training scripts into chains of Slurm submissions, each
//! backed by an immutable code snapshot and a re-runnable continuation
//! script.

/// The command line interface and relevant structures.
pub mod cli;

/// The version-control gate: only tracked scripts can be launched.
pub mod provenance;

/// The interface to the external code-snapshot tool.
pub mod snapshot;

/// The interface to a local installation of SLURM.
pub mod slurm;

/// Rendering of the per-run continuation scripts.
pub mod continuation;

/// The launch pipeline driving one invocation end to end.
pub mod launch;


/// The main CLI entry-point of the `relaunch` utility.
///
/// This function parses command-line arguments and drives the launch
/// pipeline over the given scripts.
fn main() {
    cli::process::parse_command();
}
