use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "clarity",
    about = concat!("clarity v", env!("CARGO_PKG_VERSION"), " - outlines, items, and the people working them"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace", global = true)]
    pub workspace: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace in the current directory
    Init(InitArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Name of the owning human actor (defaults to $USER)
    #[arg(long)]
    pub owner: Option<String>,
}
