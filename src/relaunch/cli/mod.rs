/// The clap definition of the command line surface.
pub mod def;

/// Custom log tokens for `colog`.
pub mod log;

/// Styling and table formatting helpers.
pub mod printing;

/// Processing of the parsed command.
pub mod process;
