// The command seam between the dispatch shell and individual slash commands.
//
// A command exposes a stable name, a declarative option schema, and an async
// handler. Everything a handler needs (translation store, persistence handle,
// cobalt client) is passed in through `Data` at invocation time; there are no
// module-level singletons.

use crate::core::database::Database;
use crate::core::i18n::{I18n, Translator};
use crate::core::registry::Registry;
use crate::infra::cobalt::CobaltClient;
use async_trait::async_trait;
use serenity::all::{
    CommandInteraction, Context, CreateCommand, ResolvedOption, ResolvedValue, Role, User,
};
use std::sync::Arc;

/// Shared runtime context injected into every command invocation.
#[derive(Clone)]
pub struct Data {
    pub i18n: Arc<I18n>,
    pub db: Option<Arc<dyn Database>>,
    pub cobalt: Arc<CobaltClient>,
    pub commands: Arc<Registry<Arc<dyn SlashCommand>>>,
}

impl Data {
    pub fn db_connected(&self) -> bool {
        self.db.is_some()
    }
}

#[async_trait]
pub trait SlashCommand: Send + Sync {
    /// Unique command name as registered with the platform.
    fn name(&self) -> &'static str;

    /// Declarative schema pushed to Discord at startup.
    fn register(&self) -> CreateCommand;

    /// Commands that touch the persistence layer are refused at dispatch
    /// time when no backend is connected, before the handler runs.
    fn requires_db(&self) -> bool {
        false
    }

    async fn run(
        &self,
        ctx: &Context,
        interaction: &CommandInteraction,
        data: &Data,
        t: &Translator,
    ) -> anyhow::Result<()>;
}

pub fn str_option<'a>(options: &'a [ResolvedOption<'_>], name: &str) -> Option<&'a str> {
    options.iter().find_map(|opt| match opt.value {
        ResolvedValue::String(s) if opt.name == name => Some(s),
        _ => None,
    })
}

pub fn bool_option(options: &[ResolvedOption<'_>], name: &str) -> Option<bool> {
    options.iter().find_map(|opt| match opt.value {
        ResolvedValue::Boolean(b) if opt.name == name => Some(b),
        _ => None,
    })
}

pub fn user_option<'a>(options: &'a [ResolvedOption<'_>], name: &str) -> Option<&'a User> {
    options.iter().find_map(|opt| match opt.value {
        ResolvedValue::User(user, _) if opt.name == name => Some(user),
        _ => None,
    })
}

pub fn role_option<'a>(options: &'a [ResolvedOption<'_>], name: &str) -> Option<&'a Role> {
    options.iter().find_map(|opt| match opt.value {
        ResolvedValue::Role(role) if opt.name == name => Some(role),
        _ => None,
    })
}

/// First subcommand (or subcommand-group) in the option list, with its
/// nested options.
pub fn subcommand<'a>(
    options: &'a [ResolvedOption<'a>],
) -> Option<(&'a str, &'a [ResolvedOption<'a>])> {
    options.iter().find_map(|opt| match &opt.value {
        ResolvedValue::SubCommand(nested) | ResolvedValue::SubCommandGroup(nested) => {
            Some((opt.name, nested.as_slice()))
        }
        _ => None,
    })
}
