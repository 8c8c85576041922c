//! `mirrorkit-build`: copy the current directory into `./public`.

mod cli;
mod logging;

use anyhow::Context;
use clap::Parser;
use mirrorkit_io_fs::{C_DIR_NAME_OUTPUT, SpecMirrorOptions, mirror};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level())?;

    let path_dir_src = std::env::current_dir().context("Failed to resolve working directory")?;
    let path_dir_dst = path_dir_src.join(C_DIR_NAME_OUTPUT);
    let spec_mirror_options =
        SpecMirrorOptions::for_build(C_DIR_NAME_OUTPUT, env!("CARGO_BIN_NAME"));

    // Per-entry failures are already logged; they do not change the exit code.
    mirror(&path_dir_src, &path_dir_dst, spec_mirror_options).context("Build failed")?;

    println!("Build complete! Files copied to {C_DIR_NAME_OUTPUT} directory.");
    Ok(())
}
