// /info - detail embeds for users, the current server, and roles.

use crate::core::i18n::Translator;
use crate::discord::command::{self, Data, SlashCommand};
use crate::discord::embed;
use async_trait::async_trait;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage, User,
};

pub struct Info;

#[async_trait]
impl SlashCommand for Info {
    fn name(&self) -> &'static str {
        "info"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Look up details about users, roles and this server.")
            .dm_permission(false)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "user",
                    "Get detailed information about a user.",
                )
                .description_localized("pl", "Uzyskaj szczegółowe informacje o użytkowniku.")
                .description_localized("es-ES", "Obtén información detallada sobre un usuario.")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::User,
                        "user",
                        "Select the user to retrieve information about.",
                    )
                    .name_localized("pl", "użytkownik")
                    .name_localized("es-ES", "usuario"),
                ),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "server",
                    "Get detailed information about the server.",
                )
                .name_localized("pl", "serwer")
                .name_localized("es-ES", "servidor")
                .description_localized("pl", "Uzyskaj szczegółowe informacje o serwerze.")
                .description_localized("es-ES", "Obtén información detallada sobre el servidor."),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "role",
                    "Get detailed information about a role.",
                )
                .name_localized("pl", "rola")
                .name_localized("es-ES", "rol")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Role,
                        "role",
                        "Select the role to retrieve information about.",
                    )
                    .required(true),
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
        let options = interaction.data.options();
        let embed = match command::subcommand(&options) {
            Some(("user", nested)) => {
                let target = command::user_option(nested, "user").unwrap_or(&interaction.user);
                user_embed(interaction, target, t)
            }
            Some(("server", _)) => server_embed(ctx, interaction, t).await?,
            Some(("role", nested)) => {
                let Some(role) = command::role_option(nested, "role") else {
                    anyhow::bail!("role subcommand without a resolved role");
                };
                embed::branded(&interaction.user)
                    .title(role.name.clone())
                    .field(t.t("modules.info.fields.id"), role.id.to_string(), true)
                    .field(
                        t.t("modules.info.fields.color"),
                        format!("#{:06X}", role.colour.0),
                        true,
                    )
                    .field(
                        t.t("modules.info.fields.position"),
                        role.position.to_string(),
                        true,
                    )
                    .field(
                        t.t("modules.info.fields.mentionable"),
                        t.t(if role.mentionable {
                            "common.yes"
                        } else {
                            "common.no"
                        }),
                        true,
                    )
            }
            _ => anyhow::bail!("unknown info subcommand"),
        };

        let message = CreateInteractionResponseMessage::new().embed(embed);
        interaction
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }
}

fn user_embed(interaction: &CommandInteraction, target: &User, t: &Translator) -> CreateEmbed {
    let created = target.id.created_at().unix_timestamp();
    embed::branded(&interaction.user)
        .title(target.display_name().to_string())
        .thumbnail(target.face())
        .field(t.t("modules.info.fields.id"), target.id.to_string(), true)
        .field(
            t.t("modules.info.fields.created"),
            format!("<t:{created}:R>"),
            true,
        )
        .field(
            t.t("modules.info.fields.bot"),
            t.t(if target.bot { "common.yes" } else { "common.no" }),
            true,
        )
}

async fn server_embed(
    ctx: &Context,
    interaction: &CommandInteraction,
    t: &Translator,
) -> anyhow::Result<CreateEmbed> {
    let Some(guild_id) = interaction.guild_id else {
        anyhow::bail!("server info requested outside a guild");
    };

    let guild = ctx.http.get_guild_with_counts(guild_id).await?;
    let created = guild_id.created_at().unix_timestamp();

    let mut embed = embed::branded(&interaction.user)
        .title(guild.name.clone())
        .field(t.t("modules.info.fields.id"), guild_id.to_string(), true)
        .field(
            t.t("modules.info.fields.owner"),
            format!("<@{}>", guild.owner_id),
            true,
        )
        .field(
            t.t("modules.info.fields.created"),
            format!("<t:{created}:R>"),
            true,
        );

    if let Some(members) = guild.approximate_member_count {
        embed = embed.field(
            t.t("modules.info.fields.members"),
            members.to_string(),
            true,
        );
    }
    if let Some(icon) = guild.icon_url() {
        embed = embed.thumbnail(icon);
    }

    Ok(embed)
}
