//! The domain types of `relaunch`, shared between the CLI and its tests.

/// Script-embedded launch configuration and the process-wide launch request.
pub mod config;

/// Accounting of the GPU-hours a launch will consume.
pub mod estimate;

/// Common file operations.
pub mod file_system;

/// The error handling for `relaunch`.
pub mod error;

/// Constant values.
pub mod constants;
