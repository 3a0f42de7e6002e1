use clap::Parser;
use clarity::cli::commands::{Cli, Commands};
use clarity::cli::handlers;

fn main() {
    let cli = Cli::parse();
    let dir = handlers::workspace_dir(cli.workspace.as_deref());

    match cli.command {
        None => {
            // No subcommand → launch TUI
            if let Err(e) = clarity::tui::run(&dir) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Init(args)) => {
            if let Err(e) = handlers::cmd_init(&dir, args) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
