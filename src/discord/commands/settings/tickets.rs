// /tickets - ticketing configuration. The full option schema is registered
// with the platform; the handlers behind it are still being built out.

use crate::core::i18n::Translator;
use crate::discord::command::{Data, SlashCommand};
use crate::discord::embed;
use async_trait::async_trait;
use serenity::all::{
    ChannelType, CommandInteraction, CommandOptionType, Context, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage, Permissions,
};

pub struct Tickets;

fn panel_name_option() -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "name", "The name of the ticket panel.")
        .name_localized("pl", "nazwa")
        .name_localized("es-ES", "nombre")
        .description_localized("pl", "Nazwa panelu zgłoszeń.")
        .description_localized("es-ES", "El nombre del panel de soporte.")
        .required(true)
}

#[async_trait]
impl SlashCommand for Tickets {
    fn name(&self) -> &'static str {
        "tickets"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Set-up ticketing system.")
            .name_localized("pl", "zgłoszenia")
            .name_localized("es-ES", "soporte")
            .description_localized("pl", "Skonfiguruj system zgłoszeń.")
            .description_localized("es-ES", "Configurar sistema de soporte.")
            .dm_permission(false)
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "create",
                    "Create a new ticket configuration.",
                )
                .name_localized("pl", "utwórz")
                .name_localized("es-ES", "crear")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "name",
                        "The name of the new ticket configuration.",
                    )
                    .name_localized("pl", "nazwa")
                    .name_localized("es-ES", "nombre")
                    .required(true),
                ),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "delete",
                    "Delete an existing ticket panel.",
                )
                .name_localized("pl", "usuń")
                .name_localized("es-ES", "eliminar")
                .add_sub_option(panel_name_option()),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "category",
                    "Set a category for the ticketing system.",
                )
                .name_localized("pl", "kategoria")
                .name_localized("es-ES", "categoría")
                .add_sub_option(panel_name_option())
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Channel,
                        "category",
                        "Select the category channel for the ticketing system.",
                    )
                    .channel_types(vec![ChannelType::Category]),
                ),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommandGroup,
                    "staff",
                    "Manage staff roles for the ticketing system.",
                )
                .name_localized("pl", "personel")
                .name_localized("es-ES", "personal")
                .add_sub_option(
                    CreateCommandOption::new(CommandOptionType::SubCommand, "add", "Add a staff role.")
                        .name_localized("pl", "dodaj")
                        .name_localized("es-ES", "agregar")
                        .add_sub_option(panel_name_option())
                        .add_sub_option(
                            CreateCommandOption::new(
                                CommandOptionType::Role,
                                "role",
                                "The staff role to add.",
                            )
                            .name_localized("pl", "rola")
                            .name_localized("es-ES", "rol")
                            .required(true),
                        ),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::SubCommand,
                        "remove",
                        "Remove a staff role.",
                    )
                    .name_localized("pl", "usuń")
                    .name_localized("es-ES", "eliminar")
                    .add_sub_option(panel_name_option())
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::Role,
                            "role",
                            "The staff role to remove.",
                        )
                        .required(true),
                    ),
                ),
            )
    }

    async fn run(
        &self,
        ctx: &Context,
        interaction: &CommandInteraction,
        _data: &Data,
        t: &Translator,
    ) -> anyhow::Result<()> {
        let message = CreateInteractionResponseMessage::new()
            .embed(embed::branded(&interaction.user).description(t.t("modules.tickets.comingSoon")))
            .ephemeral(true);
        interaction
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }
}
