use clap::Parser;
use commands::detect::Detect;
use git::Git;
use std::path::PathBuf;

mod commands;
mod config;
mod core;
mod errors;
mod format;
mod git;
mod tree;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "detect-chain")]
#[command(
    about = "List the branches forked from a branch, each with its nearest parent, in rebase order",
    long_about = None
)]
struct Cli {
    /// Run as if started in <path>
    #[arg(short = 'C', default_value = ".")]
    repository: PathBuf,

    #[command(flatten)]
    detect: Detect,
}

fn main() {
    env_logger::init();

    let args = Cli::parse();

    let result = Git::open(&args.repository).and_then(|git| args.detect.execute(&git));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
