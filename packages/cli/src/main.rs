mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{blocks, init, render, serve, BlocksArgs, InitArgs, RenderArgs, ServeArgs};

/// Tessera CLI - compose pages from content blocks
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and sample content
    Init(InitArgs),

    /// Render one page of a content document to HTML
    Render(RenderArgs),

    /// List registered block types
    Blocks(BlocksArgs),

    /// Run the content server
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Render(args) => render(args, &cwd),
                Command::Blocks(args) => blocks(args, &cwd),
                Command::Serve(args) => serve(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
