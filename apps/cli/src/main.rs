//! docscout CLI: discover every page of a documentation site.
//!
//! Walks a documentation tree from one or more seed URLs, staying inside the
//! seed's directory, and prints the pages it found.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
