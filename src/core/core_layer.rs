// The core module contains platform-agnostic logic and trait seams.
// Each concern gets its own submodule.

#[path = "i18n/i18n_store.rs"]
pub mod i18n;

#[path = "database/mod.rs"]
pub mod database;

#[path = "registry/command_registry.rs"]
pub mod registry;
