use std::env;
use std::process::exit;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use chrono::Local;
use clap::CommandFactory;
use clap::FromArgMatches;
use colog::default_builder;
use colog::formatter;
use log::info;
use log::LevelFilter;
use relaunch_lib::bailc;
use relaunch_lib::config::LaunchRequest;
use relaunch_lib::constants::ERROR_STYLE;
use relaunch_lib::ctx;
use relaunch_lib::file_system::FileSystemInteractor;

use super::log::LogTokens;
use super::printing::get_styles;
use crate::cli::def::Cli;
use crate::launch::LaunchPipeline;
use crate::snapshot::SnapshotCli;
use crate::slurm::interactor::SlurmCli;

/// This function parses the command that relaunch was run with.
pub fn parse_command() {
    let styled = Cli::command().styles(get_styles()).get_matches();

    // This unwrap will print the error if the command is wrong.
    let command = Cli::from_arg_matches(&styled).unwrap();

    // https://github.com/rust-lang/rust/blob/master/library/std/src/backtrace.rs
    let backtrace_enabled = match env::var("RUST_LIB_BACKTRACE") {
        Ok(s) => s != "0",
        Err(_) => match env::var("RUST_BACKTRACE") {
            Ok(s) => s != "0",
            Err(_) => false,
        },
    };

    if backtrace_enabled {
        eprintln!("{:?}", process_command(&command));
    } else if let Err(e) = process_command(&command) {
        eprintln!("{}error:{:#} {}", ERROR_STYLE, ERROR_STYLE, e.root_cause());
        eprint!("{}", e);
        exit(1);
    }
}

/// CLAP has parsed the command, now we process it.
pub fn process_command(cmd: &Cli) -> Result<()> {
    setup_logging(cmd)?;

    if cmd.scripts.is_empty() {
        bailc!(
            "No script provided", ;
            "There is nothing to launch", ;
            "Pass one or more training scripts: `relaunch scripts/train.sh`",
        );
    }

    // Everything the launch needs from the environment is gathered here,
    // once; the components below never consult the environment themselves.
    let request = LaunchRequest::from_env()?;
    let launched_at = Local::now().format("%Y%m%d_%H%M%S").to_string();

    let pipeline = LaunchPipeline {
        snapshots: SnapshotCli::default(),
        scheduler: SlurmCli::default(),
    };

    let fs = FileSystemInteractor;
    let total = pipeline.launch_all(&request, &cmd.scripts, &launched_at, &fs)?;

    info!("Estimated total: {total} GPU hours");

    Ok(())
}

/// Prepare the log levels for the application.
fn setup_logging(cmd: &Cli) -> Result<()> {
    let mut log_build = default_builder();
    log_build.format(formatter(LogTokens));

    if cmd.verbose == 2 {
        log_build.filter(None, LevelFilter::Trace);
    } else if cmd.verbose == 1 {
        log_build.filter(None, LevelFilter::Debug);
    } else if cmd.verbose == 0 {
        log_build.filter(None, LevelFilter::Info);
    } else {
        return Err(anyhow!("Only two levels of verbosity supported (ie. -vv)")).context("");
    }

    log_build.try_init().with_context(ctx!(
        "Failed to initialize the command line interface", ;
        "Make sure you are using a supported terminal",
    ))?;

    Ok(())
}
