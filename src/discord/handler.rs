// Gateway event handling and the per-interaction dispatch shell.
//
// Dispatch walks: received -> locale-resolved -> command-located ->
// db-precondition-checked -> executed -> error-reported. A handler failure is
// reported to the user best-effort and still surfaced to the process log;
// nothing escapes this boundary as a panic.

use crate::core::database::{tables, Database, Value};
use crate::core::i18n::{Locale, Translator};
use crate::core::registry::Registry;
use crate::discord::command::{Data, SlashCommand};
use crate::discord::embed;
use crate::row;
use async_trait::async_trait;
use serenity::all::{
    Command as ApplicationCommand, CommandInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EventHandler, GuildId,
    Interaction, Ready,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct Handler {
    data: Data,
    // Ready fires again on every reconnect; command registration and the
    // category diagnostics should only happen once.
    registered: AtomicBool,
}

impl Handler {
    pub fn new(data: Data) -> Self {
        Self {
            data,
            registered: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        if self.registered.swap(true, Ordering::SeqCst) {
            tracing::debug!("Gateway session resumed");
            return;
        }

        for (category, names) in self.data.commands.categories() {
            tracing::info!("  📁 {category}");
            for (index, name) in names.iter().enumerate() {
                let branch = if index + 1 == names.len() { "└──" } else { "├──" };
                tracing::info!("  {branch} {name}");
            }
        }

        let schemas: Vec<_> = self
            .data
            .commands
            .iter()
            .map(|(_, command)| command.register())
            .collect();
        match ApplicationCommand::set_global_commands(&ctx.http, schemas).await {
            Ok(registered) => {
                tracing::info!("Commands ({}) have been registered!", registered.len())
            }
            Err(err) => tracing::error!("Failed to register commands: {err}"),
        }

        tracing::info!(
            "Logged in as {} ({} guild(s))",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            let name = command.data.name.clone();
            if let Err(err) = dispatch(&ctx, &self.data, &command).await {
                tracing::error!(command = %name, "Command failed: {err:#}");
            }
        }
    }
}

/// Outcome of locating a command for an interaction. Pure so the
/// db-precondition contract is unit-testable without a gateway.
pub(crate) enum DispatchPlan<'a> {
    Unknown,
    DatabaseUnavailable(&'a Arc<dyn SlashCommand>),
    Run(&'a Arc<dyn SlashCommand>),
}

pub(crate) fn plan_dispatch<'a>(
    commands: &'a Registry<Arc<dyn SlashCommand>>,
    name: &str,
    db_connected: bool,
) -> DispatchPlan<'a> {
    match commands.get(name) {
        None => DispatchPlan::Unknown,
        Some(command) if command.requires_db() && !db_connected => {
            DispatchPlan::DatabaseUnavailable(command)
        }
        Some(command) => DispatchPlan::Run(command),
    }
}

/// Per-guild locale override, if one is stored. Any lookup failure keeps the
/// default locale and never blocks dispatch.
pub(crate) async fn resolve_locale(
    db: Option<&Arc<dyn Database>>,
    guild_id: Option<GuildId>,
) -> Locale {
    let (Some(db), Some(guild_id)) = (db, guild_id) else {
        return Locale::DEFAULT;
    };

    let filter = row! { "guildID" => guild_id.to_string() };
    match db.get(tables::LOCALES, Some(&filter)).await {
        Ok(rows) => rows
            .first()
            .and_then(|row| row.get("locale"))
            .and_then(Value::as_str)
            .and_then(Locale::parse)
            .unwrap_or(Locale::DEFAULT),
        Err(err) => {
            tracing::warn!(guild_id = %guild_id, "Locale lookup failed: {err}");
            Locale::DEFAULT
        }
    }
}

async fn dispatch(ctx: &Context, data: &Data, interaction: &CommandInteraction) -> anyhow::Result<()> {
    let locale = resolve_locale(data.db.as_ref(), interaction.guild_id).await;
    let translator = Translator::new(Arc::clone(&data.i18n), locale);

    match plan_dispatch(&data.commands, &interaction.data.name, data.db_connected()) {
        DispatchPlan::Unknown => {
            tracing::warn!("Command {} not found!", interaction.data.name);
            Ok(())
        }
        DispatchPlan::DatabaseUnavailable(_) => {
            let message = CreateInteractionResponseMessage::new()
                .embed(
                    embed::branded(&interaction.user)
                        .description(translator.t("common.databaseConnectionError")),
                )
                .ephemeral(true);
            let _ = interaction
                .create_response(&ctx.http, CreateInteractionResponse::Message(message))
                .await;
            Ok(())
        }
        DispatchPlan::Run(command) => {
            let command = Arc::clone(command);
            if let Err(err) = command.run(ctx, interaction, data, &translator).await {
                report_failure(ctx, interaction, &translator, command.name(), &err).await;
                return Err(err);
            }
            Ok(())
        }
    }
}

/// Best-effort diagnostic reply. The original error is returned to the
/// caller afterwards so it still reaches the process log.
async fn report_failure(
    ctx: &Context,
    interaction: &CommandInteraction,
    translator: &Translator,
    command_name: &str,
    err: &anyhow::Error,
) {
    let timestamp = chrono::Utc::now().timestamp();

    let embed = embed::branded(&interaction.user)
        .description(translator.t_with(
            "common.executionError",
            &[
                ("command", command_name),
                ("issueUrl", "https://github.com/meteor-discord/application/issues/new"),
            ],
        ))
        .field(
            translator.t("common.timestamp"),
            format!("<t:{timestamp}:R> ({timestamp})"),
            false,
        )
        .field(
            translator.t("common.error"),
            format!("```\n{err}\n```"),
            false,
        );

    // The handler may or may not have acknowledged the interaction already;
    // try a fresh response first, then a follow-up.
    let message = CreateInteractionResponseMessage::new().embed(embed.clone());
    if interaction
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
        .is_err()
    {
        let _ = interaction
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new().embed(embed),
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::i18n::I18n;
    use crate::infra::database::sqlite::SqliteDatabase;
    use serenity::all::CreateCommand;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    struct StubCommand {
        name: &'static str,
        requires_db: bool,
        invocations: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SlashCommand for StubCommand {
        fn name(&self) -> &'static str {
            self.name
        }

        fn register(&self) -> CreateCommand {
            CreateCommand::new(self.name).description("stub")
        }

        fn requires_db(&self) -> bool {
            self.requires_db
        }

        async fn run(
            &self,
            _ctx: &Context,
            _interaction: &CommandInteraction,
            _data: &Data,
            _t: &Translator,
        ) -> anyhow::Result<()> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn registry_with(
        name: &'static str,
        requires_db: bool,
        invocations: Arc<AtomicUsize>,
    ) -> Registry<Arc<dyn SlashCommand>> {
        let mut registry = Registry::new();
        let command: Arc<dyn SlashCommand> = Arc::new(StubCommand {
            name,
            requires_db,
            invocations,
        });
        registry.register("settings", name, command).unwrap();
        registry
    }

    #[test]
    fn unknown_commands_end_dispatch_without_error() {
        let registry = registry_with("locale", false, Arc::new(AtomicUsize::new(0)));
        assert!(matches!(
            plan_dispatch(&registry, "missing", true),
            DispatchPlan::Unknown
        ));
    }

    #[test]
    fn db_gated_command_is_refused_when_disconnected() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let registry = registry_with("locale", true, Arc::clone(&invocations));

        // With no backend connected the plan must refuse before the handler;
        // the handler body is therefore provably never invoked.
        assert!(matches!(
            plan_dispatch(&registry, "locale", false),
            DispatchPlan::DatabaseUnavailable(_)
        ));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn db_gated_command_runs_when_connected() {
        let registry = registry_with("locale", true, Arc::new(AtomicUsize::new(0)));
        assert!(matches!(
            plan_dispatch(&registry, "locale", true),
            DispatchPlan::Run(_)
        ));
    }

    #[test]
    fn plain_commands_run_without_a_database() {
        let registry = registry_with("ping", false, Arc::new(AtomicUsize::new(0)));
        assert!(matches!(
            plan_dispatch(&registry, "ping", false),
            DispatchPlan::Run(_)
        ));
    }

    async fn sqlite_db(dir: &tempfile::TempDir) -> Arc<dyn Database> {
        let path = dir.path().join("handler.db");
        let db = SqliteDatabase::connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        for table in tables::declared_tables() {
            db.create_table(&table).await.unwrap();
        }
        Arc::new(db)
    }

    #[tokio::test]
    async fn guild_locale_overrides_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let db = sqlite_db(&dir).await;
        let guild = GuildId::new(42);

        db.insert(
            tables::LOCALES,
            &row! { "guildID" => guild.to_string(), "locale" => "PL" },
        )
        .await
        .unwrap();

        assert_eq!(resolve_locale(Some(&db), Some(guild)).await, Locale::Pl);
    }

    #[tokio::test]
    async fn missing_override_keeps_the_default_locale() {
        let dir = tempfile::tempdir().unwrap();
        let db = sqlite_db(&dir).await;

        assert_eq!(
            resolve_locale(Some(&db), Some(GuildId::new(7))).await,
            Locale::DEFAULT
        );
        assert_eq!(resolve_locale(None, Some(GuildId::new(7))).await, Locale::DEFAULT);
        assert_eq!(resolve_locale(Some(&db), None).await, Locale::DEFAULT);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_the_default_locale() {
        // Point at a database with no tables at all: the SELECT fails, and
        // dispatch still proceeds with the default locale.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        let db: Arc<dyn Database> = Arc::new(
            SqliteDatabase::connect(&format!("sqlite://{}?mode=rwc", path.display()))
                .await
                .unwrap(),
        );

        assert_eq!(
            resolve_locale(Some(&db), Some(GuildId::new(1))).await,
            Locale::DEFAULT
        );
    }

    #[test]
    fn translator_binds_resolved_locale() {
        let mut tables_map = HashMap::new();
        tables_map.insert(
            Locale::Pl,
            HashMap::from([("greeting".to_string(), "cześć".to_string())]),
        );
        let translator = Translator::new(Arc::new(I18n::from_tables(tables_map)), Locale::Pl);

        assert_eq!(translator.t("greeting"), "cześć");
        assert_eq!(translator.locale(), Locale::Pl);
    }
}
