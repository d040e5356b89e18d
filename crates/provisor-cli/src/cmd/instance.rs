use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use provisor_core::resource::{Operation, Resource};
use provisor_core::types::{OperationState, ResourceKind};
use provisor_core::OperationHandle;

use crate::cmd::{open_app, App, Ctx};
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum InstanceSubcommand {
    /// Provision a new service instance
    Create {
        name: String,
        /// Name of a registered broker
        #[arg(long)]
        broker: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Request an update of an instance
    Update {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Deprovision an instance (its keys must be deleted first)
    Delete { name: String },
    /// List instances and their current operations
    List,
    /// Show one instance in detail
    Show { name: String },
}

pub fn run(root: &Path, subcmd: InstanceSubcommand, ctx: &Ctx) -> anyhow::Result<()> {
    let app = open_app(root)?;
    match subcmd {
        InstanceSubcommand::Create {
            name,
            broker,
            description,
        } => {
            let (_, handle) = app
                .manager
                .create_instance(&name, &broker, &description, app.actor(ctx), &ctx.policy)
                .with_context(|| format!("failed to create instance '{name}'"))?;
            report(ctx, &handle, "Created", "Create", "instance", &name)
        }
        InstanceSubcommand::Update { name, description } => {
            let handle = app
                .manager
                .update_instance(&name, &description, app.actor(ctx), &ctx.policy)
                .with_context(|| format!("failed to update instance '{name}'"))?;
            report(ctx, &handle, "Updated", "Update", "instance", &name)
        }
        InstanceSubcommand::Delete { name } => {
            let handle = app
                .manager
                .delete_instance(&name, "", app.actor(ctx))
                .with_context(|| format!("failed to delete instance '{name}'"))?;
            report(ctx, &handle, "Deleted", "Delete", "instance", &name)
        }
        InstanceSubcommand::List => list(&app, ctx),
        InstanceSubcommand::Show { name } => show(&app, &name, ctx),
    }
}

/// Shared success reporting for mutation subcommands.
pub(crate) fn report(
    ctx: &Ctx,
    handle: &OperationHandle,
    done_verb: &str,
    queued_verb: &str,
    kind: &str,
    name: &str,
) -> anyhow::Result<()> {
    if ctx.json {
        print_json(&serde_json::json!({
            "resource_id": handle.resource_id,
            "state": handle.state.as_str(),
        }))?;
        return Ok(());
    }
    match handle.state {
        OperationState::InProgress => println!("{queued_verb} accepted for {kind}: {name} (in progress)"),
        _ => println!("{done_verb} {kind}: {name}"),
    }
    Ok(())
}

pub(crate) fn operation_summary(op: &Option<Operation>) -> String {
    match op {
        Some(op) => format!("{} {}", op.kind, op.state),
        None => "-".to_string(),
    }
}

fn list(app: &App, ctx: &Ctx) -> anyhow::Result<()> {
    let resources: Vec<Resource> = app
        .db
        .list_resources()
        .context("failed to list resources")?
        .into_iter()
        .filter(|r| r.kind == ResourceKind::Instance)
        .collect();

    if ctx.json {
        let mut summaries = Vec::new();
        for r in &resources {
            let op = app.db.current_operation(r.id)?;
            summaries.push(serde_json::json!({
                "id": r.id,
                "name": r.name,
                "operation": op,
            }));
        }
        print_json(&summaries)?;
    } else {
        let mut rows = Vec::new();
        for r in &resources {
            let op = app.db.current_operation(r.id)?;
            rows.push(vec![r.name.clone(), operation_summary(&op), r.id.to_string()]);
        }
        print_table(&["NAME", "LAST OPERATION", "ID"], rows);
    }
    Ok(())
}

fn show(app: &App, name: &str, ctx: &Ctx) -> anyhow::Result<()> {
    let instance = app
        .db
        .find_resource(name, ResourceKind::Instance)?
        .with_context(|| format!("instance not found: {name}"))?;
    let op = app.db.current_operation(instance.id)?;
    let keys = app.db.children_of(instance.id)?;

    if ctx.json {
        print_json(&serde_json::json!({
            "instance": instance,
            "operation": op,
            "keys": keys.iter().map(|k| k.name.clone()).collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    println!("Instance: {}", instance.name);
    println!("  id:         {}", instance.id);
    println!("  broker:     {}", instance.broker_id);
    println!("  created at: {}", instance.created_at.to_rfc3339());
    match &op {
        Some(op) => {
            println!("  operation:  {} {}", op.kind, op.state);
            if !op.description.is_empty() {
                println!("  detail:     {}", op.description);
            }
        }
        None => println!("  operation:  none"),
    }
    if !keys.is_empty() {
        println!(
            "  keys:       {}",
            keys.iter()
                .map(|k| k.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
