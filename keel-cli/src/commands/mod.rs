//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod dependency;
mod stack;

pub use dependency::DependencyCommands;
pub use stack::StackCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Stack management and orchestration
    Stack {
        #[command(subcommand)]
        command: StackCommands,
    },
    /// Dependency edges between stacks
    #[command(alias = "dep")]
    Dependency {
        #[command(subcommand)]
        command: DependencyCommands,
    },
}

/// Route the command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Stack { command } => stack::handle_stack_command(command, config).await,
        Commands::Dependency { command } => {
            dependency::handle_dependency_command(command, config).await
        }
    }
}
