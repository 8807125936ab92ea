/**
 * WebSocket Routes
 * Upgrade endpoint feeding the in-process relay
 */
use axum::{
    extract::{
        ws::{Message, WebSocket},
        ConnectInfo, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;

use crate::relay::Relay;
use crate::AppState;

/// GET /ws - Upgrade and hand the socket to the relay
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    tracing::debug!(%addr, "websocket upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state.relay))
}

/// Pump frames between the socket and the relay until either side closes.
/// Text frames go to the relay; binary and other control frames are ignored.
async fn handle_socket(socket: WebSocket, relay: Relay) {
    let (mut sink, mut stream) = socket.split();
    let (conn_id, mut rx) = relay.register().await;

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => relay.handle_frame(conn_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn = conn_id, error = %e, "websocket read error");
                break;
            }
        }
    }

    relay.deregister(conn_id).await;
    writer.abort();
    tracing::debug!(conn = conn_id, "websocket connection closed");
}
