mod app;
mod config;
mod input;
mod logging;
mod page;
mod render;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    logging::init(args.log_file.as_deref())?;
    app::run(args)
}
