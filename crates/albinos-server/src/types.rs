//! Shared types for the configuration service server.
//!
//! This module defines:
//! - `ClientId`: a lightweight handle for connected clients
//! - channel aliases between client tasks and the service loop
//! - `ClientEvent`: messages flowing from client tasks to the service loop

use std::collections::HashMap;
use std::sync::Arc;

use albinos_core::{Answer, Request, RequestState};
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Identifier for a connected client.
///
/// This is intentionally opaque; we just guarantee uniqueness over the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// Outbound messages from the service loop to a given client.
pub type OutboundTx = mpsc::UnboundedSender<Answer>;
pub type OutboundRx = mpsc::UnboundedReceiver<Answer>;

/// Registry of connected clients and their outbound channels.
///
/// - Key: `ClientId`
/// - Value: `OutboundTx` to queue `Answer`s for that client's socket.
pub type ClientRegistry = Arc<RwLock<HashMap<ClientId, OutboundTx>>>;

/// Message flowing from a client task into the central service loop.
///
/// A decode failure is forwarded as the request state to reply with, so
/// error replies keep their place in the per-connection response order.
#[derive(Debug)]
pub enum ClientEvent {
    /// A connection was accepted; a session must be created.
    Connected { client_id: ClientId },

    /// One inbound frame, decoded or not.
    Request {
        client_id: ClientId,
        request: Result<Request, RequestState>,
    },

    /// The connection ended; the session and its subscriptions go away.
    Disconnected { client_id: ClientId },
}

/// Channel from client tasks → service loop.
pub type ServiceTx = mpsc::UnboundedSender<ClientEvent>;
pub type ServiceRx = mpsc::UnboundedReceiver<ClientEvent>;
