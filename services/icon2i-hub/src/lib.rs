//! ICON-2I hub service: configuration and the HTTP job adapter.

pub mod config;
pub mod server;

pub use config::HubConfig;
pub use server::{build_router, start_server, ServerState};
