use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use beacon_core::{ClientEnvelope, ParticipantId};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// WebSocket entry point. The path segment is the caller's identity,
/// already verified by the authentication collaborator in front of us.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let identity = ParticipantId::from(user_id);

    ws.on_upgrade(move |socket| handle_socket(socket, identity, service))
}

/// Per-connection session: a writer task draining the outbound channel onto
/// the socket and a reader task feeding envelopes to the router. Whichever
/// task finishes first aborts the other, then the Closed transition runs
/// exactly once.
async fn handle_socket(socket: WebSocket, identity: ParticipantId, service: SignalingService) {
    info!(%identity, "websocket connected");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = service.connect(&identity, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() {
                break;
            }
            if is_close {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let identity = identity.clone();
        let handle = handle.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                // Closed is terminal: a superseded session stops processing
                // even if frames are still in flight. The check races a
                // concurrent supersede: one frame can pass it while the
                // Closed transition runs and be routed afterwards. Anything
                // such a frame writes is keyed by the shared identity, so
                // the replacement's own leave_all sweeps it up.
                if handle.is_closed() {
                    break;
                }
                match msg {
                    Message::Text(text) => match ClientEnvelope::from_json(text.as_str()) {
                        Ok(envelope) => service.router().handle(&identity, envelope),
                        Err(e) => {
                            warn!(%identity, "malformed envelope: {}", e.reason());
                            service.report_error(&identity, e.reason());
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.disconnect(&identity, &handle);
    info!(%identity, "websocket disconnected");
}
