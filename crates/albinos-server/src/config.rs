//! Configuration for the service process.
//!
//! Intentionally simple: defaults, overridable through a few environment
//! variables:
//!
//! - `ALBINOS_SOCKET_PATH` (default: `<temp-dir>/raven-os_service_albinos.sock`)
//! - `ALBINOS_DB_PATH`     (default: `./albinos_service.db`)
//! - `ALBINOS_MAX_CLIENTS` (default: `1024`)

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Well-known socket file name; existing clients connect to this path
/// under the system temp directory.
pub const SOCKET_FILE_NAME: &str = "raven-os_service_albinos.sock";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the UNIX-domain socket to listen on.
    pub socket_path: PathBuf,

    /// Path of the SQLite database file.
    pub db_path: PathBuf,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,
}

impl Config {
    /// Construct a `Config` from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Result<Self> {
        let socket_path = env::var_os("ALBINOS_SOCKET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(SOCKET_FILE_NAME));

        let db_path = env::var_os("ALBINOS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("albinos_service.db"));

        let max_clients = match env::var("ALBINOS_MAX_CLIENTS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid ALBINOS_MAX_CLIENTS value: {raw:?}"))?,
            Err(_) => 1024,
        };

        Ok(Config {
            socket_path,
            db_path,
            max_clients,
        })
    }
}
