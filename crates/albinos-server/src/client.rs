//! Per-client connection handler.
//!
//! Responsibilities:
//! - Read raw chunks from the UNIX socket and split them into JSON
//!   object frames via `albinos-protocol`.
//! - Decode frames and forward them into the central service loop; a
//!   frame that fails to decode is forwarded as the state to reply with,
//!   so even error replies keep their place in the response order.
//! - Concurrently drain this client's outbound channel and write each
//!   answer back as a bare JSON object.
//!
//! A decode failure never closes the connection; only end-of-stream or a
//! socket error does.

use albinos_protocol::{decode_request, encode_answer, JsonFramer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::types::{ClientEvent, ClientId, ClientRegistry, OutboundRx, ServiceTx};

/// Run the client I/O loop for a single connection.
///
/// - `client_id`: unique identifier for this connection.
/// - `stream`: the accepted UNIX stream.
/// - `service_tx`: channel into the central service loop.
/// - `out_rx`: channel receiving `Answer`s destined for this client.
/// - `clients`: shared registry to allow removal on disconnect.
pub async fn run_client(
    client_id: ClientId,
    stream: UnixStream,
    service_tx: ServiceTx,
    mut out_rx: OutboundRx,
    clients: ClientRegistry,
) {
    let (mut read_half, mut write_half) = stream.into_split();

    // Writer task: consume `Answer`s and write them as JSON objects.
    let writer_handle = tokio::spawn(async move {
        while let Some(answer) = out_rx.recv().await {
            let bytes = match encode_answer(&answer) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(client = client_id.0, error = %e, "answer serialization failed");
                    continue;
                }
            };
            if let Err(e) = write_half.write_all(&bytes).await {
                debug!(client = client_id.0, error = %e, "write failed");
                break;
            }
        }
    });

    // Reader loop: chunks → frames → decoded requests → service loop.
    let mut framer = JsonFramer::new();
    let mut chunk = [0u8; 4096];
    'reader: loop {
        let n = match read_half.read(&mut chunk).await {
            Ok(0) => {
                debug!(client = client_id.0, "end of stream");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                debug!(client = client_id.0, error = %e, "read failed");
                break;
            }
        };

        framer.push(&chunk[..n]);
        while let Some(frame) = framer.next_frame() {
            let request = decode_request(&frame).map_err(|e| {
                debug!(client = client_id.0, error = %e, "request decode failed");
                e.reply_state()
            });
            if service_tx
                .send(ClientEvent::Request { client_id, request })
                .is_err()
            {
                debug!(client = client_id.0, "service loop gone, closing client");
                break 'reader;
            }
        }
    }

    // Remove the client from the registry and tear down its session.
    {
        let mut guard = clients.write().await;
        guard.remove(&client_id);
    }
    let _ = service_tx.send(ClientEvent::Disconnected { client_id });

    // The registry entry held the last persistent sender; the writer task
    // finishes once in-flight answers are drained.
    let _ = writer_handle.await;
    debug!(client = client_id.0, "client torn down");
}
