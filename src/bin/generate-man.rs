//! Render the pmtrack man page to stdout, or to the path given as the first argument.

use clap::CommandFactory;
use pmtrack::cli::Cli;
use std::io::Write;

fn main() -> std::io::Result<()> {
    let man = clap_mangen::Man::new(Cli::command());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    match std::env::args().nth(1) {
        Some(path) => std::fs::write(path, buffer),
        None => std::io::stdout().write_all(&buffer),
    }
}
