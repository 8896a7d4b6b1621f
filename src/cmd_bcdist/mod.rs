//! Subcommand modules for the `bcdist` binary.

pub mod pairs;
pub mod samples;
pub mod utils;
