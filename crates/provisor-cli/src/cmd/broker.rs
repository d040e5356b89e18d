use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use provisor_core::resource::{validate_name, Broker};

use crate::cmd::{open_app, Ctx};
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum BrokerSubcommand {
    /// Register a broker
    Add {
        name: String,
        /// Base URL, e.g. https://broker.example.com
        #[arg(long)]
        url: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "PROVISOR_BROKER_PASSWORD")]
        password: String,
    },
    /// List registered brokers
    List,
    /// Deregister a broker (must have no provisioned resources)
    Remove { name: String },
}

pub fn run(root: &Path, subcmd: BrokerSubcommand, ctx: &Ctx) -> anyhow::Result<()> {
    match subcmd {
        BrokerSubcommand::Add {
            name,
            url,
            username,
            password,
        } => add(root, &name, &url, &username, &password, ctx),
        BrokerSubcommand::List => list(root, ctx),
        BrokerSubcommand::Remove { name } => remove(root, &name),
    }
}

fn remove(root: &Path, name: &str) -> anyhow::Result<()> {
    let app = open_app(root)?;
    let broker = app
        .db
        .find_broker(name)?
        .with_context(|| format!("broker not found: {name}"))?;
    app.db
        .remove_broker(broker.id)
        .with_context(|| format!("failed to remove broker '{name}'"))?;
    println!("Removed broker: {name}");
    Ok(())
}

fn add(
    root: &Path,
    name: &str,
    url: &str,
    username: &str,
    password: &str,
    ctx: &Ctx,
) -> anyhow::Result<()> {
    validate_name(name)?;
    let app = open_app(root)?;
    let broker = Broker::new(name, url, username, password);
    app.db
        .insert_broker(&broker)
        .with_context(|| format!("failed to register broker '{name}'"))?;

    if ctx.json {
        print_json(&serde_json::json!({
            "id": broker.id,
            "name": broker.name,
            "url": broker.url,
        }))?;
    } else {
        println!("Registered broker: {name} — {url}");
    }
    Ok(())
}

fn list(root: &Path, ctx: &Ctx) -> anyhow::Result<()> {
    let app = open_app(root)?;
    let brokers = app.db.list_brokers().context("failed to list brokers")?;

    if ctx.json {
        let summaries: Vec<_> = brokers
            .iter()
            .map(|b| {
                serde_json::json!({
                    "id": b.id,
                    "name": b.name,
                    "url": b.url,
                })
            })
            .collect();
        print_json(&summaries)?;
    } else {
        let rows = brokers
            .iter()
            .map(|b| vec![b.name.clone(), b.url.clone(), b.id.to_string()])
            .collect();
        print_table(&["NAME", "URL", "ID"], rows);
    }
    Ok(())
}
