use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;

use crate::cmd::{open_app, Ctx};
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum OpsSubcommand {
    /// Report operations stuck in progress for longer than the given age.
    ///
    /// These need operator reconciliation against the broker; they are
    /// never resolved automatically.
    Stuck {
        #[arg(long, default_value = "3600")]
        max_age_secs: u64,
    },
}

pub fn run(root: &Path, subcmd: OpsSubcommand, ctx: &Ctx) -> anyhow::Result<()> {
    let app = open_app(root)?;
    match subcmd {
        OpsSubcommand::Stuck { max_age_secs } => {
            let stuck = app
                .db
                .stuck_operations(Duration::from_secs(max_age_secs))
                .context("failed to scan operations")?;

            if ctx.json {
                let summaries: Vec<_> = stuck
                    .iter()
                    .map(|(r, op)| {
                        serde_json::json!({
                            "resource_id": r.id,
                            "name": r.name,
                            "kind": r.kind,
                            "operation": op,
                        })
                    })
                    .collect();
                print_json(&summaries)?;
            } else if stuck.is_empty() {
                println!("No stuck operations.");
            } else {
                let rows = stuck
                    .iter()
                    .map(|(r, op)| {
                        vec![
                            r.name.clone(),
                            r.kind.to_string(),
                            op.kind.to_string(),
                            op.updated_at.to_rfc3339(),
                        ]
                    })
                    .collect();
                print_table(&["NAME", "KIND", "OPERATION", "SINCE"], rows);
            }
            Ok(())
        }
    }
}
