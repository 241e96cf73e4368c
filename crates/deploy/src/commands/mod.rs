//! CLI subcommands.

pub mod plan;
pub mod synth;
