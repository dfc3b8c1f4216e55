use anyhow::Context;
use argo_rtqc::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    match commands::run(args).context("Quality control run failed") {
        Ok(_summary) => {
            // QC failures are reported in the output, not the exit code
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
