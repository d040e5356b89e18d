use std::path::Path;

use clap::Subcommand;
use provisor_core::flags::Flag;

use crate::cmd::{open_app, Ctx};
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum FlagSubcommand {
    /// List feature flags and their effective values
    List,
    /// Enable a feature flag
    Enable { name: String },
    /// Disable a feature flag
    Disable {
        name: String,
        /// Custom message shown to blocked callers
        #[arg(long)]
        error_message: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: FlagSubcommand, ctx: &Ctx) -> anyhow::Result<()> {
    let app = open_app(root)?;
    match subcmd {
        FlagSubcommand::List => {
            let statuses = app.manager.flags().list()?;
            if ctx.json {
                print_json(&statuses)?;
            } else {
                let rows = statuses
                    .iter()
                    .map(|s| {
                        vec![
                            s.name.to_string(),
                            if s.enabled { "enabled" } else { "disabled" }.to_string(),
                            if s.overridden { "override" } else { "default" }.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["FLAG", "VALUE", "SOURCE"], rows);
            }
            Ok(())
        }
        FlagSubcommand::Enable { name } => {
            let flag: Flag = name.parse()?;
            app.manager.flags().set_override(flag, true, None)?;
            println!("Enabled: {flag}");
            Ok(())
        }
        FlagSubcommand::Disable {
            name,
            error_message,
        } => {
            let flag: Flag = name.parse()?;
            app.manager.flags().set_override(flag, false, error_message)?;
            println!("Disabled: {flag}");
            Ok(())
        }
    }
}
