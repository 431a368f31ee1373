// /ping - latency check against the REST API and the persistence layer.

use crate::core::database::tables;
use crate::core::i18n::Translator;
use crate::discord::command::{Data, SlashCommand};
use crate::discord::embed;
use crate::row;
use async_trait::async_trait;
use serenity::all::{
    CommandInteraction, Context, CreateActionRow, CreateButton, CreateCommand,
    CreateInteractionResponse, CreateInteractionResponseMessage,
};
use std::time::Instant;

pub struct Ping;

#[async_trait]
impl SlashCommand for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Check the latency of our services.")
            .description_localized("pl", "Sprawdź opóźnienie naszych serwisów.")
            .description_localized("es-ES", "Verifica la latencia de nuestros servicios.")
    }

    async fn run(
        &self,
        ctx: &Context,
        interaction: &CommandInteraction,
        data: &Data,
        t: &Translator,
    ) -> anyhow::Result<()> {
        let api_start = Instant::now();
        ctx.http.get_gateway().await?;
        let api_ms = api_start.elapsed().as_millis();

        let db_latency = match &data.db {
            Some(db) => {
                let db_start = Instant::now();
                let probe = row! { "guildID" => "0" };
                db.get(tables::LOCALES, Some(&probe)).await?;
                format!("{}ms", db_start.elapsed().as_millis())
            }
            None => t.t("common.databaseConnectionError"),
        };

        let embed = embed::branded(&interaction.user)
            .description(format!(":ping_pong: {}", t.t("modules.ping.response")))
            .field(t.t("modules.ping.fields.api"), format!("{api_ms}ms"), true)
            .field(t.t("modules.ping.fields.database"), db_latency, true);

        let buttons = CreateActionRow::Buttons(vec![
            CreateButton::new_link("https://discord.gg/92uqkS7Zyt")
                .label(t.t("modules.ping.buttons.reportIssues")),
            CreateButton::new_link("https://meteors.cc/status")
                .label(t.t("modules.ping.buttons.servicesStatus")),
        ]);

        let message = CreateInteractionResponseMessage::new()
            .embed(embed)
            .components(vec![buttons]);
        interaction
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }
}
