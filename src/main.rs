use anyhow::Result;
use cir::cli::{Cli, Commands};
use cir::{CirContext, commands};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            EnvFilter::new("cir=debug")
        } else {
            EnvFilter::from_default_env()
        })
        .with_writer(io::stderr)
        .init();

    // Completion needs no repository; everything else gets a context.
    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let ctx = CirContext::new()?;

    match cli.command {
        Commands::Init { clone } => {
            commands::init::execute(&ctx, clone.as_deref())?;
        }
        Commands::Register { files, message } => {
            commands::register::execute(&ctx, &files, message.as_deref())?;
        }
        Commands::Deregister { files, message } => {
            commands::deregister::execute(&ctx, &files, message.as_deref())?;
        }
        Commands::Status {
            files,
            show_diff,
            all,
        } => {
            commands::status::execute(&ctx, &files, show_diff, all)?;
        }
        Commands::Update { files, message } => {
            commands::update::execute(&ctx, &files, message.as_deref())?;
        }
        Commands::Restore { files, force } => {
            commands::restore::execute(&ctx, &files, force)?;
        }
        Commands::Completion { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
