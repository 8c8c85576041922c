//! Command-line surface of the build command.
//!
//! The command takes no operands: it always mirrors the current working
//! directory into `./public`. Flags only tune log verbosity.

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "mirrorkit-build",
    version,
    about = "Copy the current project directory into ./public"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Default log level when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
