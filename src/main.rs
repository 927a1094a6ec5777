//! Render worker: reads one JSON render job on stdin, writes the PNG on
//! stdout. Started and torn down once per render by the isolated executor.

use std::io;

use anyhow::Result;

fn main() -> Result<()> {
    // stdout carries the image, so logs go to stderr only.
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    matchup_histogram::render::isolated::run_worker(io::stdin().lock(), io::stdout().lock())
}
