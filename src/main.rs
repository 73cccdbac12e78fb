//! # fusel CLI Entry Point
//!
//! Takes a list of request strings, registers the git driver with the
//! engine and runs it.
//!
//! Exit status is 0 on success and on an unsatisfiable request set (a message
//! is printed), and the engine's negative result code otherwise.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::PathBuf;

use fusel::config::{CheckoutMode, Manifest};
use fusel::engine::{Engine, RunOutcome};
use fusel::git::{GitDriver, GitOptions};

#[derive(Parser)]
#[command(name = "fusel")]
#[command(about = "Fetch git dependencies and check out the requested refs", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Requests: a project name from the manifest (`name[@ref]`) or a git URL (`[name=]url[#ref]`)
    requests: Vec<String>,

    /// Manifest file [default: ./fusel.toml, then the user config dir]
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Base directory for working copies
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Discard local modifications when checking out
    #[arg(long)]
    force: bool,

    /// Fail instead of prompting for credentials
    #[arg(long)]
    no_prompt: bool,

    /// Hide progress output
    #[arg(short, long)]
    quiet: bool,

    /// Print each step
    #[arg(short, long)]
    verbose: bool,

    /// Generate a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        return;
    }

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            println!("Error: {:#}", e);
            std::process::exit(-1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let manifest = match &cli.manifest {
        Some(path) => Manifest::load(path)?,
        None => Manifest::find_default()?,
    };

    let dest = cli
        .dest
        .clone()
        .or_else(|| manifest.settings.dest.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let options = GitOptions {
        checkout: if cli.force {
            CheckoutMode::Force
        } else {
            manifest.settings.checkout
        },
        interactive: !cli.no_prompt && manifest.settings.prompt && console::user_attended(),
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let mut engine = Engine::new(manifest, dest).verbose(cli.verbose);
    engine.add_driver(Box::new(GitDriver::new(options)));
    for request in &cli.requests {
        engine.add_request(request)?;
    }

    let outcome = engine.run();
    let code = outcome.code();
    match outcome {
        RunOutcome::Satisfied => Ok(0),
        RunOutcome::Unsatisfiable(missing) => {
            for (request, reason) in &missing {
                println!("{} {}: {}", "!".yellow(), request, reason);
            }
            println!("The request is not satisfiable!");
            Ok(0)
        }
        RunOutcome::Failed(_) => {
            println!(
                "Error: {}",
                engine.error_message().unwrap_or("unknown error")
            );
            Ok(code)
        }
    }
}
