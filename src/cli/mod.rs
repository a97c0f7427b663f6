mod output;
mod repl;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::controller::SessionController;
use crate::core::config::{self, AppConfig, NamingPolicy};
use crate::core::context::ContextKey;
use crate::core::error::BotError;
use crate::core::session::{Session, SessionId};
use crate::generator::create_generator;
use crate::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "brainbot", version, about = "Chatbot with simulated RAG embedding contexts")]
struct Cli {
    /// Embedding context to start with (science, history, technology)
    #[arg(long)]
    context: Option<String>,

    /// Session naming policy (timestamp, first-message)
    #[arg(long)]
    naming: Option<String>,

    /// Data directory for the session archive
    #[arg(long)]
    data_dir: Option<String>,

    /// Run without the SQLite archive (in-memory sessions only)
    #[arg(long)]
    no_archive: bool,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

/// Wires the controller to its collaborators for the REPL.
pub struct App {
    pub config: AppConfig,
    pub controller: SessionController,
    pub db: Option<Database>,
}

impl App {
    /// Write the session at `index` through to the archive.
    pub async fn persist_session_at(&self, index: usize) -> Result<(), BotError> {
        let Some(db) = &self.db else {
            return Ok(());
        };
        if let Some(session) = self.controller.store().get(index) {
            db.archive().save(session, index).await?;
        }
        Ok(())
    }

    /// Remove `removed` from the archive and compact positions.
    pub async fn persist_delete(&self, removed: &Session) -> Result<(), BotError> {
        let Some(db) = &self.db else {
            return Ok(());
        };
        let archive = db.archive();
        archive.delete(&removed.id).await?;
        let order: Vec<SessionId> = self
            .controller
            .store()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        archive.update_positions(&order).await?;
        Ok(())
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config(None)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(key) = cli.context.as_deref() {
        match ContextKey::parse(key) {
            Some(context) => config.default_context = context,
            None => anyhow::bail!("unknown context '{key}' (science, history, technology)"),
        }
    }
    if let Some(naming) = cli.naming.as_deref() {
        config.naming = match naming {
            "timestamp" => NamingPolicy::Timestamp,
            "first-message" | "first_message" => NamingPolicy::FirstMessage,
            other => anyhow::bail!("unknown naming policy '{other}'"),
        };
    }
    if cli.no_archive {
        config.archive = false;
    }
    if cli.debug {
        config.debug = true;
    }

    init_tracing(config.debug);

    let mut controller =
        SessionController::new(create_generator(), config.naming, config.default_context);

    let db = if config.archive {
        let db = Database::open(&config).await?;
        db.run_migrations().await?;
        let archived = db.archive().load_all().await?;
        if !archived.is_empty() {
            tracing::debug!(count = archived.len(), "hydrating archived sessions");
            controller.seed(archived);
        }
        Some(db)
    } else {
        None
    };

    let app = App {
        config,
        controller,
        db,
    };
    repl::run(app).await
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "brainbot=debug" } else { "brainbot=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
