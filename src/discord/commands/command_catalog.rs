// Static command catalog. Every command module registers here at startup;
// the category labels mirror the sub-directory each command lives in and are
// used only for startup diagnostics.

#[path = "info/info.rs"]
pub mod info;

#[path = "info/ping.rs"]
pub mod ping;

#[path = "settings/locale.rs"]
pub mod locale;

#[path = "settings/tickets.rs"]
pub mod tickets;

#[path = "tools/cobalt.rs"]
pub mod cobalt;

use crate::core::registry::{Registry, RegistryError};
use crate::discord::command::SlashCommand;
use std::sync::Arc;

fn catalog() -> Vec<(&'static str, Vec<Arc<dyn SlashCommand>>)> {
    vec![
        ("info", vec![Arc::new(info::Info), Arc::new(ping::Ping)]),
        (
            "settings",
            vec![
                Arc::new(locale::LocaleSetting::new()),
                Arc::new(tickets::Tickets),
            ],
        ),
        ("tools", vec![Arc::new(cobalt::CobaltDownload)]),
    ]
}

pub fn build_registry() -> Result<Registry<Arc<dyn SlashCommand>>, RegistryError> {
    let mut registry = Registry::new();
    for (category, commands) in catalog() {
        for command in commands {
            registry.register(category, command.name(), command)?;
        }
    }
    Ok(registry)
}
