/**
 * WebSocket Transport
 *
 * `GET /socket?token=<access token>` upgrades to a WebSocket carrying JSON
 * text frames `{"event": ..., "data": ...}` in both directions.
 *
 * # Handshake
 *
 * The token comes from the `token` query parameter, falling back to the
 * `Authorization: Bearer` header. It is checked before the upgrade: an
 * invalid or missing token is answered with 401 and no socket is opened.
 *
 * # Tasks per Connection
 *
 * - a writer task drains the connection's outbound channel into the socket
 * - the reader loop handles inbound frames one at a time, so replies and
 *   broadcasts caused by one client keep their emission order
 */

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use super::connection;
use super::hub::RealtimeHub;
use crate::backend::middleware::extract_bearer;
use crate::shared::{frame, ClientFrame, Identity, ServerFrame};

#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    pub token: Option<String>,
}

/// Realtime endpoint (GET /socket)
///
/// # Errors
///
/// * `401 Unauthorized` - token missing, invalid or expired
/// * `400`/`426` - request is not a WebSocket upgrade
pub async fn socket_handler(
    State(hub): State<RealtimeHub>,
    Query(params): Query<SocketParams>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let token = params
        .token
        .or_else(|| extract_bearer(&headers).ok().map(str::to_string));
    let identity = match hub.authenticate(token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!("[Realtime] Handshake refused: {}", e);
            return e.into_response();
        }
    };

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    tracing::debug!("[Realtime] User {} authenticated, upgrading", identity.user_id);
    upgrade.on_upgrade(move |socket| run_connection(socket, hub, identity))
}

async fn run_connection(socket: WebSocket, hub: RealtimeHub, identity: Identity) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = connection::channel();
    let connection_id = hub.connect(identity, tx);

    let mut writer = tokio::spawn(async move {
        while let Some(outgoing) = rx.recv().await {
            let text = match serde_json::to_string(&outgoing) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("[Realtime] Failed to encode {}: {}", outgoing.event, e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientFrame>(text.as_str()) {
                        Ok(incoming) => hub.handle_frame(connection_id, incoming).await,
                        Err(e) => {
                            hub.send_to(
                                connection_id,
                                ServerFrame::error(frame::ERROR, format!("Malformed frame: {}", e)),
                            );
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Pings are answered by the transport; binary frames are not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("[Realtime] Socket error on {}: {}", connection_id, e);
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    hub.disconnect(connection_id);
    writer.abort();
    tracing::debug!(
        "[Realtime] Connection {} {:?}",
        connection_id,
        hub.connection_state(connection_id)
    );
}
