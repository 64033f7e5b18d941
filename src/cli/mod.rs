//! CLI argument parsing.

mod args;
mod validators;

pub use args::{AnnotateArgs, Cli, Command, ConfigAction};
