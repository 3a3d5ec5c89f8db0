//! Library side of the `tvp` binary: logging setup and dataset/argument
//! helpers shared by the subcommands.

pub mod dataset;
pub mod logging;
