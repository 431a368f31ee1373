// Entry point of the bot.
//
// **Architecture overview:**
// - `core/` = platform-agnostic logic (i18n, persistence contract, registry)
// - `infra/` = implementations of core traits (SQLite/Postgres, cobalt API)
// - `discord/` = Discord-specific adapters (commands, event handler)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services concurrently (dependency injection)
// 3. Hand the shared context to the gateway client and start it

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::database::{Database, DatabaseError};
use crate::core::i18n::I18n;
use crate::discord::{Data, Handler};
use crate::infra::cobalt::CobaltClient;
use anyhow::Context as _;
use serenity::all::{Client, GatewayIntents};
use std::sync::Arc;

const DEFAULT_COBALT_INSTANCE: &str = "https://cobalt.meteors.cc/";

fn init_tracing() {
    // Production quiets the default to info; RUST_LOG always wins.
    let production = std::env::var("ENVIRONMENT")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);
    let default_level = if production { "info" } else { "debug" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connect the configured backend and create the declared tables.
///
/// A missing or unreachable database is not fatal: the bot runs with
/// persistence-dependent commands refused at dispatch time. A bad URL scheme
/// or a malformed table descriptor is a configuration bug and aborts startup.
async fn connect_database(url: Option<String>) -> anyhow::Result<Option<Arc<dyn Database>>> {
    let Some(url) = url else {
        tracing::warn!("DATABASE_URL not set; running without persistence");
        return Ok(None);
    };

    match infra::database::init(&url).await {
        Ok(db) => {
            tracing::info!("Connected to Database");
            Ok(Some(db))
        }
        Err(err @ (DatabaseError::UnsupportedScheme(_) | DatabaseError::InvalidSchema(_))) => {
            Err(err).context("database configuration is invalid")
        }
        Err(err) => {
            tracing::error!("Error connecting to Database: {err}");
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let token =
        std::env::var("DISCORD_TOKEN").context("Missing DISCORD_TOKEN environment variable")?;
    let locales_dir = std::env::var("LOCALES_DIR").unwrap_or_else(|_| "locales".to_string());
    let database_url = std::env::var("DATABASE_URL").ok();

    let cobalt = Arc::new(CobaltClient::new(
        std::env::var("COBALT_API_URL").unwrap_or_else(|_| DEFAULT_COBALT_INSTANCE.to_string()),
        std::env::var("COBALT_API_KEY").ok(),
    ));

    // The command table comes from the static catalog; translations and the
    // database are loaded concurrently before any event is accepted.
    let commands = Arc::new(discord::commands::build_registry()?);
    let (i18n, db) = tokio::join!(I18n::load(&locales_dir), connect_database(database_url));

    let data = Data {
        i18n: Arc::new(i18n),
        db: db?,
        cobalt,
        commands,
    };

    let intents = GatewayIntents::GUILDS;
    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(data))
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
