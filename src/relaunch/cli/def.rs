use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;

/// Structure of the main command (relaunch).
#[allow(unused)]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Relaunch, a chained launcher for training scripts on Slurm",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// The training scripts to launch, in order.
    #[arg(value_name = "SCRIPT")]
    pub scripts: Vec<PathBuf>,

    /// Verbose mode, displays debug info. For even more try: -vv.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
