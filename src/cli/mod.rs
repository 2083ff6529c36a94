//! Command-line interface for the comparison pipeline.

/// CLI arguments.
pub mod args;

/// Comparison command driver.
pub mod compare;

/// Logging macros and global verbosity.
pub mod logging;
