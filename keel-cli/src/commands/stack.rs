//! Stack command handlers
//!
//! Handles stack CRUD plus deploy, teardown, status, and tree views.

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use keel_client::OrchestratorClient;
use keel_core::domain::stack::Stack;
use keel_core::domain::status::StackStatus;
use keel_core::domain::tree::{DependencyTree, DependentTree};
use keel_core::dto::deploy::TeardownOutcome;
use keel_core::dto::stack::{CreateStack, UpdateStack};
use uuid::Uuid;

use crate::config::Config;
use crate::id_resolver::resolve_stack_id;

/// Stack subcommands
#[derive(Subcommand)]
pub enum StackCommands {
    /// Create a stack from a compose file
    Create {
        /// Stack name
        #[arg(short, long)]
        name: String,

        /// Path to the compose manifest
        #[arg(short, long)]
        file: String,

        /// Working directory the manifest is run from
        #[arg(long)]
        cwd: Option<String>,

        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List all stacks
    List,
    /// Show a stack and its manifest
    Get {
        /// Stack ID or unambiguous prefix
        id: String,
    },
    /// Update fields of a stack
    Update {
        /// Stack ID or unambiguous prefix
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        /// Path to a replacement compose manifest
        #[arg(short, long)]
        file: Option<String>,

        #[arg(long)]
        cwd: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a stack and its dependency edges
    Delete {
        /// Stack ID or unambiguous prefix
        id: String,
    },
    /// Deploy a stack, cycling its dependents
    Deploy {
        /// Stack ID or unambiguous prefix
        id: String,

        /// Leave dependents torn down afterwards
        #[arg(long)]
        no_dependents: bool,
    },
    /// Tear down a stack and its dependents
    Teardown {
        /// Stack ID or unambiguous prefix
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<String>,

        /// Tear down every stack
        #[arg(long)]
        all: bool,
    },
    /// Show live container status
    Status {
        /// Stack ID or unambiguous prefix
        id: String,
    },
    /// Show what a stack depends on, or what depends on it
    Tree {
        /// Stack ID or unambiguous prefix
        id: String,

        /// Walk dependents instead of dependencies
        #[arg(long)]
        dependents: bool,
    },
}

/// Handle stack commands
pub async fn handle_stack_command(command: StackCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        StackCommands::Create {
            name,
            file,
            cwd,
            notes,
        } => create_stack(&client, name, &file, cwd, notes).await,
        StackCommands::List => list_stacks(&client).await,
        StackCommands::Get { id } => get_stack(&client, &id).await,
        StackCommands::Update {
            id,
            name,
            file,
            cwd,
            notes,
        } => {
            let code = file.as_deref().map(read_manifest).transpose()?;
            let patch = UpdateStack {
                name,
                code,
                cwd,
                notes,
            };
            update_stack(&client, &id, patch).await
        }
        StackCommands::Delete { id } => delete_stack(&client, &id).await,
        StackCommands::Deploy { id, no_dependents } => {
            deploy_stack(&client, &id, !no_dependents).await
        }
        StackCommands::Teardown { id: Some(id), .. } => teardown_stack(&client, &id).await,
        StackCommands::Teardown { id: None, .. } => teardown_all(&client).await,
        StackCommands::Status { id } => stack_status(&client, &id).await,
        StackCommands::Tree { id, dependents } => stack_tree(&client, &id, dependents).await,
    }
}

fn read_manifest(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read manifest: {}", path))
}

async fn create_stack(
    client: &OrchestratorClient,
    name: String,
    file: &str,
    cwd: Option<String>,
    notes: String,
) -> Result<()> {
    let code = read_manifest(file)?;

    let stack = client
        .create_stack(CreateStack {
            name,
            code,
            cwd,
            notes,
        })
        .await?;

    println!("{}", "✓ Stack created successfully!".green().bold());
    println!("  ID:   {}", stack.id.to_string().cyan());
    println!("  Name: {}", stack.name.bold());

    Ok(())
}

async fn list_stacks(client: &OrchestratorClient) -> Result<()> {
    let stacks = client.list_stacks().await?;

    if stacks.is_empty() {
        println!("{}", "No stacks found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} stack(s):", stacks.len()).bold());
    println!();
    for stack in &stacks {
        println!("  {} {}", "▸".cyan(), stack.name.bold());
        println!("    ID:      {}", stack.id.to_string().dimmed());
        println!(
            "    Created: {}",
            stack
                .created_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
        if !stack.notes.is_empty() {
            println!("    Notes:   {}", stack.notes.dimmed());
        }
        println!();
    }

    Ok(())
}

async fn get_stack(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_stack_id(client, id).await?;
    let stack = client.get_stack(uuid).await?;

    println!("{}", "Stack Details:".bold());
    println!("  ID:      {}", stack.id.to_string().cyan());
    println!("  Name:    {}", stack.name.bold());
    if let Some(cwd) = &stack.cwd {
        println!("  Cwd:     {}", cwd);
    }
    if !stack.notes.is_empty() {
        println!("  Notes:   {}", stack.notes);
    }
    println!("  Created: {}", stack.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated: {}", stack.updated_at.format("%Y-%m-%d %H:%M:%S"));

    println!("\n{}", "Manifest:".bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", stack.code.trim_end());
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}

async fn update_stack(client: &OrchestratorClient, id: &str, patch: UpdateStack) -> Result<()> {
    if patch.is_empty() {
        println!("{}", "Nothing to update.".yellow());
        return Ok(());
    }

    let uuid = resolve_stack_id(client, id).await?;
    let stack = client.update_stack(uuid, patch).await?;

    println!(
        "{}",
        format!("✓ Stack {} updated successfully!", stack.name)
            .green()
            .bold()
    );

    Ok(())
}

async fn delete_stack(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_stack_id(client, id).await?;
    client.delete_stack(uuid).await?;

    println!(
        "{}",
        format!("✓ Stack {} deleted successfully!", uuid)
            .green()
            .bold()
    );

    Ok(())
}

async fn deploy_stack(client: &OrchestratorClient, id: &str, deploy_dependents: bool) -> Result<()> {
    let uuid = resolve_stack_id(client, id).await?;
    println!("Deploying stack {}...", uuid.to_string().cyan());

    let outcome = client.deploy_stack(uuid, deploy_dependents).await?;

    println!(
        "{}",
        format!("✓ Stack {} deployed successfully!", outcome.stack.name)
            .green()
            .bold()
    );
    println!("  Command: {}", outcome.result.command.dimmed());

    Ok(())
}

async fn teardown_stack(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_stack_id(client, id).await?;
    println!("Tearing down stack {}...", uuid.to_string().cyan());

    let outcome = client.teardown_stack(uuid).await?;
    print_teardown(&outcome, 1);

    Ok(())
}

async fn teardown_all(client: &OrchestratorClient) -> Result<()> {
    let outcomes = client.teardown_all_stacks().await?;

    if outcomes.is_empty() {
        println!("{}", "No stacks found.".yellow());
        return Ok(());
    }

    for outcome in &outcomes {
        print_teardown(outcome, 1);
    }

    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    if failed > 0 {
        anyhow::bail!("{} teardown(s) failed", failed);
    }

    Ok(())
}

async fn stack_status(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_stack_id(client, id).await?;
    let status = client.stack_status(uuid).await?;

    print_status(&status);

    Ok(())
}

async fn stack_tree(client: &OrchestratorClient, id: &str, dependents: bool) -> Result<()> {
    let uuid = resolve_stack_id(client, id).await?;
    let names: HashMap<Uuid, String> = client
        .list_stacks()
        .await?
        .into_iter()
        .map(|s: Stack| (s.id, s.name))
        .collect();

    if dependents {
        let tree = client.dependent_tree(uuid).await?;
        println!(
            "{}",
            format!("{} stack(s) depend on this one:", tree.all_dependents.len()).bold()
        );
        print_dependent_tree(&tree, &names, 0);
    } else {
        let tree = client.dependency_tree(uuid).await?;
        println!(
            "{}",
            format!("Depends on {} stack(s):", tree.all_dependencies.len()).bold()
        );
        print_dependency_tree(&tree, &names, 0);
    }

    Ok(())
}

// =============================================================================
// Printing
// =============================================================================

fn label(id: Uuid, names: &HashMap<Uuid, String>) -> String {
    match names.get(&id) {
        Some(name) => format!("{} {}", name.bold(), id.to_string().dimmed()),
        None => id.to_string(),
    }
}

fn print_dependency_tree(tree: &DependencyTree, names: &HashMap<Uuid, String>, depth: usize) {
    println!("{}{} {}", "  ".repeat(depth), "▸".cyan(), label(tree.stack_id, names));
    for child in &tree.dependencies {
        print_dependency_tree(child, names, depth + 1);
    }
}

fn print_dependent_tree(tree: &DependentTree, names: &HashMap<Uuid, String>, depth: usize) {
    println!("{}{} {}", "  ".repeat(depth), "▸".cyan(), label(tree.stack_id, names));
    for child in &tree.dependents {
        print_dependent_tree(child, names, depth + 1);
    }
}

fn print_teardown(outcome: &TeardownOutcome, depth: usize) {
    for dependent in &outcome.dependents {
        print_teardown(dependent, depth + 1);
    }

    let indent = "  ".repeat(depth);
    match &outcome.error {
        None => println!("{}{} {} torn down", indent, "✓".green(), outcome.stack.name.bold()),
        Some(error) => println!(
            "{}{} {} failed: {}",
            indent,
            "✗".red(),
            outcome.stack.name.bold(),
            error.red()
        ),
    }
}

fn print_status(status: &StackStatus) {
    if !status.deployed {
        println!("{}", "Not deployed".yellow());
        return;
    }

    if status.all_green {
        println!("{}", "✓ Deployed, all services green".green().bold());
    } else {
        println!("{}", "✗ Deployed, degraded".red().bold());
    }

    for service in status.services.values() {
        let state = if service.is_green() {
            service.state.green()
        } else {
            service.state.red()
        };
        println!(
            "  {} {:<20} {:<10} exit {:<4} {}",
            "▸".cyan(),
            service.service.bold(),
            state,
            service.exit_code,
            service.status.dimmed()
        );
    }
}
