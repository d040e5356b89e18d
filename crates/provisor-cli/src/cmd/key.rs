use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use provisor_core::resource::Resource;
use provisor_core::types::ResourceKind;

use crate::cmd::instance::{operation_summary, report};
use crate::cmd::{open_app, App, Ctx};
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum KeySubcommand {
    /// Bind a new service key against an instance
    Create {
        name: String,
        /// Name of the owning instance
        #[arg(long)]
        instance: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Unbind and delete a service key
    Delete { name: String },
    /// List keys and their current operations
    List,
}

pub fn run(root: &Path, subcmd: KeySubcommand, ctx: &Ctx) -> anyhow::Result<()> {
    let app = open_app(root)?;
    match subcmd {
        KeySubcommand::Create {
            name,
            instance,
            description,
        } => {
            let (_, handle) = app
                .manager
                .create_key(&name, &instance, &description, app.actor(ctx), &ctx.policy)
                .with_context(|| format!("failed to create key '{name}'"))?;
            report(ctx, &handle, "Created", "Create", "key", &name)
        }
        KeySubcommand::Delete { name } => {
            let handle = app
                .manager
                .delete_key(&name, "", app.actor(ctx))
                .with_context(|| format!("failed to delete key '{name}'"))?;
            report(ctx, &handle, "Deleted", "Delete", "key", &name)
        }
        KeySubcommand::List => list(&app, ctx),
    }
}

fn list(app: &App, ctx: &Ctx) -> anyhow::Result<()> {
    let keys: Vec<Resource> = app
        .db
        .list_resources()
        .context("failed to list resources")?
        .into_iter()
        .filter(|r| r.kind == ResourceKind::Key)
        .collect();

    if ctx.json {
        let mut summaries = Vec::new();
        for k in &keys {
            let op = app.db.current_operation(k.id)?;
            summaries.push(serde_json::json!({
                "id": k.id,
                "name": k.name,
                "instance_id": k.parent_id,
                "operation": op,
            }));
        }
        print_json(&summaries)?;
    } else {
        let mut rows = Vec::new();
        for k in &keys {
            let instance = match k.parent_id {
                Some(id) => app
                    .db
                    .get_resource(id)?
                    .map(|r| r.name)
                    .unwrap_or_else(|| id.to_string()),
                None => "-".to_string(),
            };
            let op = app.db.current_operation(k.id)?;
            rows.push(vec![k.name.clone(), instance, operation_summary(&op)]);
        }
        print_table(&["NAME", "INSTANCE", "LAST OPERATION"], rows);
    }
    Ok(())
}
