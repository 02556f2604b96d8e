//! albinos-server
//!
//! Multi-client async UNIX-socket server for the Albinos configuration
//! service.
//!
//! This crate glues together:
//! - `albinos-core`
//! - `albinos-protocol`
//! - `albinos-store`
//! and exposes a `server::run(Config)` entrypoint.

pub mod client;
pub mod config;
pub mod server;
pub mod service;
pub mod session;
pub mod types;
