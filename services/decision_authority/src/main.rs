use std::io::{self, Read};

use anyhow::Context;
use decision_authority::cli::TopLevel;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: TopLevel = argh::from_env();

    let mut input = String::new();
    if args.reads_stdin() {
        io::stdin()
            .read_to_string(&mut input)
            .context("reading stdin")?;
    }

    println!("{}", args.run(&input)?);
    Ok(())
}
