// The infra module contains implementations of core traits and clients for
// external services. Each implementation goes in its own submodule.

#[path = "database/mod.rs"]
pub mod database;

#[path = "cobalt/cobalt_client.rs"]
pub mod cobalt;
