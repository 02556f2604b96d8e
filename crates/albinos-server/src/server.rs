//! UNIX-socket listener and top-level server wiring.
//!
//! This module:
//! - Opens the store and spawns the single central service loop that
//!   owns it.
//! - Removes a stale socket file and binds the listener.
//! - Accepts connections, assigns each a `ClientId`, registers its
//!   outbound channel, and spawns a per-client I/O task.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use albinos_store::{ConfigStore, StoreError};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::client;
use crate::config::Config;
use crate::service;
use crate::types::{ClientEvent, ClientId, ClientRegistry, OutboundRx, OutboundTx, ServiceTx};

/// Global-ish counter for assigning unique `ClientId`s.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    let id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
    ClientId(id)
}

/// Failures while bringing the service up.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("socket: {0}")]
    Io(#[from] io::Error),
}

/// A bound service, ready to accept clients.
pub struct Server {
    listener: UnixListener,
    max_clients: usize,
    clients: ClientRegistry,
    service_tx: ServiceTx,
}

/// Open the store, bind the socket, and run the accept loop until the
/// process is stopped.
pub async fn run(config: Config) -> Result<(), ServerError> {
    bind(config).await?.serve().await?;
    Ok(())
}

/// Bring the service up without entering the accept loop.
///
/// Splitting bind from serve lets callers (tests included) learn the
/// socket is ready before the first client connects.
pub async fn bind(config: Config) -> Result<Server, ServerError> {
    let store = ConfigStore::open(&config.db_path)?;

    clean_stale_socket(&config.socket_path)?;
    let listener = UnixListener::bind(&config.socket_path)?;

    let clients: ClientRegistry = Arc::new(RwLock::new(HashMap::new()));
    let (service_tx, service_rx) = mpsc::unbounded_channel();

    // Spawn the central service loop; it owns the store and all sessions.
    {
        let clients = clients.clone();
        tokio::spawn(async move {
            service::run_service_loop(service_rx, clients, store).await;
        });
    }

    info!(
        socket = %config.socket_path.display(),
        db = %config.db_path.display(),
        max_clients = config.max_clients,
        "configuration service listening"
    );

    Ok(Server {
        listener,
        max_clients: config.max_clients,
        clients,
        service_tx,
    })
}

impl Server {
    /// Accept clients until the process is stopped.
    pub async fn serve(self) -> io::Result<()> {
        loop {
            let (stream, _addr) = self.listener.accept().await?;

            let current_clients = {
                let guard = self.clients.read().await;
                guard.len()
            };
            if current_clients >= self.max_clients {
                warn!(
                    max_clients = self.max_clients,
                    "rejecting connection: max_clients reached"
                );
                // Just drop the stream; the client sees a closed socket.
                continue;
            }

            let client_id = next_client_id();
            debug!(client = client_id.0, "accepted connection");

            // Create the outbound channel for this client and register it.
            let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();
            {
                let mut guard = self.clients.write().await;
                guard.insert(client_id, out_tx);
            }

            if self
                .service_tx
                .send(ClientEvent::Connected { client_id })
                .is_err()
            {
                error!("service loop gone, stopping accept loop");
                return Ok(());
            }

            let service_tx = self.service_tx.clone();
            let clients = self.clients.clone();
            tokio::spawn(async move {
                client::run_client(client_id, stream, service_tx, out_rx, clients).await;
            });
        }
    }
}

fn clean_stale_socket(path: &Path) -> io::Result<()> {
    if path.exists() {
        warn!(path = %path.display(), "socket file already exists, removing");
        std::fs::remove_file(path)?;
    }
    Ok(())
}
