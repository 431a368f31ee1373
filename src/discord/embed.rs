// Branded embed defaults shared by every reply.

use serenity::all::{CreateEmbed, CreateEmbedAuthor, User};

pub const BRAND_COLOR: u32 = 0xE3223B;

/// Base embed: brand color plus an author line for the invoking user.
pub fn branded(author: &User) -> CreateEmbed {
    let display = author.display_name();
    let name = if display == author.name {
        author.name.clone()
    } else {
        format!("{} ({display})", author.name)
    };

    CreateEmbed::new().color(BRAND_COLOR).author(
        CreateEmbedAuthor::new(name)
            .icon_url(author.face())
            .url(format!("https://discord.com/users/{}", author.id)),
    )
}
