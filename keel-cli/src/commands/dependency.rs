//! Dependency command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use keel_client::OrchestratorClient;
use keel_core::domain::stack::StackDependency;
use keel_core::dto::dependency::{CreateStackDependency, UpdateStackDependency};

use crate::config::Config;
use crate::id_resolver::{resolve_dependency_id, resolve_stack_id};

/// Dependency subcommands
#[derive(Subcommand)]
pub enum DependencyCommands {
    /// Record that STACK depends on DEPENDS_ON
    Add {
        /// Dependent stack ID or prefix
        stack: String,

        /// Stack ID or prefix it depends on
        depends_on: String,

        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List dependency edges
    List {
        /// Only edges out of this stack
        #[arg(long)]
        stack: Option<String>,

        /// Only edges into this stack
        #[arg(long)]
        depends_on: Option<String>,
    },
    /// Show a dependency edge
    Get {
        /// Dependency ID or unambiguous prefix
        id: String,
    },
    /// Move an edge or change its notes
    Update {
        /// Dependency ID or unambiguous prefix
        id: String,

        #[arg(long)]
        stack: Option<String>,

        #[arg(long)]
        depends_on: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a dependency edge
    #[command(alias = "rm")]
    Remove {
        /// Dependency ID or unambiguous prefix
        id: String,
    },
}

/// Handle dependency commands
pub async fn handle_dependency_command(command: DependencyCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        DependencyCommands::Add {
            stack,
            depends_on,
            notes,
        } => add_dependency(&client, &stack, &depends_on, notes).await,
        DependencyCommands::List { stack, depends_on } => {
            list_dependencies(&client, stack.as_deref(), depends_on.as_deref()).await
        }
        DependencyCommands::Get { id } => get_dependency(&client, &id).await,
        DependencyCommands::Update {
            id,
            stack,
            depends_on,
            notes,
        } => update_dependency(&client, &id, stack.as_deref(), depends_on.as_deref(), notes).await,
        DependencyCommands::Remove { id } => remove_dependency(&client, &id).await,
    }
}

async fn add_dependency(
    client: &OrchestratorClient,
    stack: &str,
    depends_on: &str,
    notes: String,
) -> Result<()> {
    let stack_id = resolve_stack_id(client, stack).await?;
    let depends_on_stack_id = resolve_stack_id(client, depends_on).await?;

    let edge = client
        .add_dependency(CreateStackDependency {
            stack_id,
            depends_on_stack_id,
            notes,
        })
        .await?;

    println!("{}", "✓ Dependency added successfully!".green().bold());
    print_edge(&edge);

    Ok(())
}

async fn list_dependencies(
    client: &OrchestratorClient,
    stack: Option<&str>,
    depends_on: Option<&str>,
) -> Result<()> {
    let stack_id = match stack {
        Some(id) => Some(resolve_stack_id(client, id).await?),
        None => None,
    };
    let depends_on_stack_id = match depends_on {
        Some(id) => Some(resolve_stack_id(client, id).await?),
        None => None,
    };

    let edges = client
        .list_dependencies(stack_id, depends_on_stack_id)
        .await?;

    if edges.is_empty() {
        println!("{}", "No dependencies found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} dependency(ies):", edges.len()).bold());
    println!();
    for edge in &edges {
        print_edge(edge);
        println!();
    }

    Ok(())
}

async fn get_dependency(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_dependency_id(client, id).await?;
    let edge = client.get_dependency(uuid).await?;

    print_edge(&edge);

    Ok(())
}

async fn update_dependency(
    client: &OrchestratorClient,
    id: &str,
    stack: Option<&str>,
    depends_on: Option<&str>,
    notes: Option<String>,
) -> Result<()> {
    let uuid = resolve_dependency_id(client, id).await?;

    let stack_id = match stack {
        Some(id) => Some(resolve_stack_id(client, id).await?),
        None => None,
    };
    let depends_on_stack_id = match depends_on {
        Some(id) => Some(resolve_stack_id(client, id).await?),
        None => None,
    };

    let edge = client
        .update_dependency(
            uuid,
            UpdateStackDependency {
                stack_id,
                depends_on_stack_id,
                notes,
            },
        )
        .await?;

    println!("{}", "✓ Dependency updated successfully!".green().bold());
    print_edge(&edge);

    Ok(())
}

async fn remove_dependency(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_dependency_id(client, id).await?;
    client.delete_dependency(uuid).await?;

    println!(
        "{}",
        format!("✓ Dependency {} removed successfully!", uuid)
            .green()
            .bold()
    );

    Ok(())
}

fn print_edge(edge: &StackDependency) {
    println!("  {} {}", "▸".cyan(), edge.id.to_string().dimmed());
    println!(
        "    {} {} {}",
        edge.stack_id.to_string().bold(),
        "depends on".dimmed(),
        edge.depends_on_stack_id.to_string().bold()
    );
    if !edge.notes.is_empty() {
        println!("    Notes: {}", edge.notes.dimmed());
    }
}
