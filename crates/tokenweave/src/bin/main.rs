//! tokenweave command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Placeholder template tools
#[derive(Parser)]
#[command(name = "tokenweave")]
#[command(author, version, about = "Placeholder template rendering tools", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template against the demo providers
    Render {
        /// Template text, e.g. "pid={pid} name={field:name}"
        template: String,

        /// Context fields as key=value (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Resolve server-level tokens only
        #[arg(long)]
        server_only: bool,
    },
    /// List the demo registry's tokens
    Tokens,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Render {
            template,
            fields,
            server_only,
        } => {
            let output = tokenweave::cli::render(&template, &fields, server_only)?;
            println!("{output}");
        }
        Commands::Tokens => {
            for token in tokenweave::cli::tokens() {
                println!("{}", token.cyan());
            }
        }
    }
    Ok(())
}
