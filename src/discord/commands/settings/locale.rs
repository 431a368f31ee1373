// /locale - per-guild locale override, stored in the Locales table.
//
// Picking English removes the override row (English is the fallback anyway);
// any other choice inserts or updates it. A per-guild cooldown keeps the
// setting from being flapped.

use crate::core::database::tables;
use crate::core::i18n::{Locale, Translator};
use crate::discord::command::{self, Data, SlashCommand};
use crate::discord::embed;
use crate::row;
use anyhow::Context as _;
use async_trait::async_trait;
use dashmap::DashMap;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponse, CreateInteractionResponseMessage, Permissions,
};
use std::time::{Duration, Instant};

const COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Default)]
pub struct LocaleSetting {
    // Guild id -> last successful change.
    cooldowns: DashMap<u64, Instant>,
}

impl LocaleSetting {
    pub fn new() -> Self {
        Self::default()
    }

    fn on_cooldown(&self, guild_id: u64) -> bool {
        let expired = match self.cooldowns.get(&guild_id) {
            Some(changed_at) if changed_at.elapsed() < COOLDOWN => return true,
            Some(_) => true,
            None => false,
        };
        // Guard is dropped before touching the map again.
        if expired {
            self.cooldowns.remove(&guild_id);
        }
        false
    }
}

#[async_trait]
impl SlashCommand for LocaleSetting {
    fn name(&self) -> &'static str {
        "locale"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Change the locale of the bot.")
            .name_localized("pl", "język")
            .name_localized("es-ES", "idioma")
            .description_localized("pl", "Zmień język bota.")
            .description_localized("es-ES", "Cambia el idioma del bot.")
            .dm_permission(false)
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "locale",
                    "The new locale of the bot.",
                )
                .name_localized("pl", "język")
                .name_localized("es-ES", "idioma")
                .description_localized("pl", "Nowy język bota.")
                .description_localized("es-ES", "El nuevo idioma del bot.")
                .required(true)
                .add_string_choice("English", "EN")
                .add_string_choice("Polski", "PL")
                .add_string_choice("Español", "ES"),
            )
    }

    fn requires_db(&self) -> bool {
        true
    }

    async fn run(
        &self,
        ctx: &Context,
        interaction: &CommandInteraction,
        data: &Data,
        t: &Translator,
    ) -> anyhow::Result<()> {
        let guild_id = interaction
            .guild_id
            .context("locale command invoked outside a guild")?;

        if self.on_cooldown(guild_id.get()) {
            let message = CreateInteractionResponseMessage::new()
                .embed(embed::branded(&interaction.user).description(t.t("modules.locale.cooldown")))
                .ephemeral(true);
            interaction
                .create_response(&ctx.http, CreateInteractionResponse::Message(message))
                .await?;
            return Ok(());
        }

        let options = interaction.data.options();
        let choice = command::str_option(&options, "locale")
            .context("required 'locale' option missing")?
            .to_string();

        let db = data.db.as_ref().context("database gate should have refused dispatch")?;
        let filter = row! { "guildID" => guild_id.to_string() };
        let existing = db.get(tables::LOCALES, Some(&filter)).await?;

        if !existing.is_empty() && choice == "EN" {
            db.delete(tables::LOCALES, &filter).await?;
        } else if existing.is_empty() {
            db.insert(
                tables::LOCALES,
                &row! { "guildID" => guild_id.to_string(), "locale" => choice.clone() },
            )
            .await?;
        } else {
            db.update(tables::LOCALES, &row! { "locale" => choice.clone() }, &filter)
                .await?;
        }

        self.cooldowns.insert(guild_id.get(), Instant::now());

        // Confirm in the locale that was just selected, not the old one.
        let new_locale = Locale::parse(&choice).unwrap_or(Locale::DEFAULT);
        let confirmation = t.for_locale(new_locale).t("modules.locale.success");

        let message = CreateInteractionResponseMessage::new()
            .embed(embed::branded(&interaction.user).description(confirmation));
        interaction
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_expires_after_the_window() {
        let command = LocaleSetting::new();
        assert!(!command.on_cooldown(1));

        command.cooldowns.insert(1, Instant::now());
        assert!(command.on_cooldown(1));

        if let Some(past) = Instant::now().checked_sub(COOLDOWN + Duration::from_secs(1)) {
            command.cooldowns.insert(1, past);
            assert!(!command.on_cooldown(1));
            // The stale entry was cleaned up.
            assert!(command.cooldowns.get(&1).is_none());
        }
    }

    #[test]
    fn cooldowns_are_tracked_per_guild() {
        let command = LocaleSetting::new();
        command.cooldowns.insert(1, Instant::now());

        assert!(command.on_cooldown(1));
        assert!(!command.on_cooldown(2));
    }
}
