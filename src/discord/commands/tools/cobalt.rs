// /cobalt - media download proxy. Resolves a URL through the configured
// cobalt instance and re-uploads the result as attachments.

use crate::core::i18n::Translator;
use crate::discord::command::{self, Data, SlashCommand};
use crate::discord::embed;
use anyhow::Context as _;
use async_trait::async_trait;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateAttachment, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage,
    EditInteractionResponse,
};

use crate::infra::cobalt::{normalize_error_code, CobaltStatus};

// Discord caps attachments per message.
const MAX_PICKER_FILES: usize = 10;

pub struct CobaltDownload;

#[async_trait]
impl SlashCommand for CobaltDownload {
    fn name(&self) -> &'static str {
        "cobalt"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description(
                "Free, open-source and efficient media downloader (https://github.com/imputnet/cobalt)",
            )
            .description_localized(
                "pl",
                "Bezpłatny, otwartoźródłowy i wydajny downloader multimediów (https://github.com/imputnet/cobalt)",
            )
            .description_localized(
                "es-ES",
                "Descargador de medios gratuito, de código abierto y eficiente (https://github.com/imputnet/cobalt)",
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "url", "The URL to download.")
                    .description_localized("pl", "URL do pobrania.")
                    .description_localized("es-ES", "URL para descargar.")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Boolean,
                    "ephemeral",
                    "Whether the message should be ephemeral or not.",
                )
                .name_localized("pl", "tymczasowe")
                .name_localized("es-ES", "efímero")
                .description_localized("pl", "Czy wiadomość powinna być tymczasowa czy nie.")
                .description_localized("es-ES", "Si el mensaje debe ser efímero o no."),
            )
    }

    async fn run(
        &self,
        ctx: &Context,
        interaction: &CommandInteraction,
        data: &Data,
        t: &Translator,
    ) -> anyhow::Result<()> {
        let options = interaction.data.options();
        let url = command::str_option(&options, "url").context("required 'url' option missing")?;
        let ephemeral = command::bool_option(&options, "ephemeral").unwrap_or(false);

        let message = CreateInteractionResponseMessage::new()
            .embed(
                embed::branded(&interaction.user)
                    .description(t.t("modules.cobalt.status.downloading")),
            )
            .ephemeral(ephemeral);
        interaction
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await?;

        let response = data.cobalt.resolve(url).await?;
        tracing::debug!(status = ?response.status, "Cobalt resolved request");

        let mut attachments = Vec::new();
        match response.status {
            CobaltStatus::Tunnel | CobaltStatus::Redirect => {
                let file_url = response.url.context("tunnel response without a url")?;
                let bytes = data.cobalt.download(&file_url).await?;
                let filename = response.filename.unwrap_or_else(|| "file.bin".to_string());
                attachments.push(CreateAttachment::bytes(bytes, filename));
            }
            CobaltStatus::Picker => {
                let picker = response.picker.context("picker response without items")?;
                for (index, item) in picker.iter().take(MAX_PICKER_FILES).enumerate() {
                    let bytes = data.cobalt.download(&item.url).await?;
                    let filename = format!("{}.{}", index + 1, item.kind.extension());
                    attachments.push(CreateAttachment::bytes(bytes, filename));
                }
            }
            CobaltStatus::Error => {
                let code = response
                    .error
                    .map(|e| normalize_error_code(&e.code))
                    .unwrap_or_else(|| "generic".to_string());
                let key = format!("modules.cobalt.apiErrors.{code}");
                let translated = t.t(&key);
                // A key echoed back means there is no specific translation.
                let description = if translated == key {
                    t.t("modules.cobalt.apiErrors.generic")
                } else {
                    translated
                };

                interaction
                    .edit_response(
                        &ctx.http,
                        EditInteractionResponse::new()
                            .embed(embed::branded(&interaction.user).description(description)),
                    )
                    .await?;
                return Ok(());
            }
        }

        let mut edit = EditInteractionResponse::new()
            .embed(embed::branded(&interaction.user).description(t.t("modules.cobalt.status.done")));
        for attachment in attachments {
            edit = edit.new_attachment(attachment);
        }
        interaction.edit_response(&ctx.http, edit).await?;
        Ok(())
    }
}
