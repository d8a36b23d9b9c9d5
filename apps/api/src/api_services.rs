mod database;
mod redis;
mod sessions;
mod state_builder;

pub use database::connect_and_migrate;
pub use sessions::build_postgres_session_layer;
#[cfg(test)]
pub(crate) use sessions::configure_session_layer;
pub use state_builder::build_app_state;
#[cfg(test)]
pub(crate) use state_builder::{RepositorySet, assemble_app_state};
