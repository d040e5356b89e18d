pub mod broker;
pub mod flag;
pub mod init;
pub mod instance;
pub mod key;
pub mod ops;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use provisor_core::config::Config;
use provisor_core::events::TracingRecorder;
use provisor_core::flags::RequestPolicy;
use provisor_core::{LifecycleDb, LifecycleManager};

/// Per-invocation context derived from global CLI flags.
pub struct Ctx {
    pub json: bool,
    pub actor: Option<String>,
    pub policy: RequestPolicy,
}

pub(crate) struct App {
    pub db: Arc<LifecycleDb>,
    pub manager: LifecycleManager,
    pub config: Config,
}

impl App {
    pub fn actor<'a>(&'a self, ctx: &'a Ctx) -> &'a str {
        ctx.actor.as_deref().unwrap_or(&self.config.actor)
    }
}

pub(crate) fn open_app(root: &Path) -> anyhow::Result<App> {
    let config = Config::load(root).context("failed to load config")?;
    let db = Arc::new(
        LifecycleDb::open(&provisor_core::paths::db_path(root))
            .context("failed to open lifecycle db")?,
    );
    let manager = LifecycleManager::new(Arc::clone(&db), &config, Arc::new(TracingRecorder))
        .context("failed to build lifecycle manager")?;
    Ok(App {
        db,
        manager,
        config,
    })
}
