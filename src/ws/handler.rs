//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::runner::RoomEvent;
use crate::game::{RoomCommand, RoomHandle};
use crate::http::middleware::{resolve_identity, Identity};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsQuery {
    /// Access token for members
    pub token: Option<String>,
    /// Stable id for guests
    pub client_id: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    match resolve_identity(
        query.token.as_deref(),
        query.client_id.as_deref(),
        state.config.jwt_secret.as_deref(),
    ) {
        Ok(identity) => {
            info!(user_id = %identity.user_id, is_guest = identity.is_guest, "WebSocket upgrade");
            ws.on_upgrade(move |socket| handle_socket(socket, identity, state))
        }
        Err(e) => {
            warn!(error = %e, "WebSocket auth failed");
            e.into_response()
        }
    }
}

/// Per-connection state for the reader loop
struct Session {
    identity: Identity,
    state: AppState,
    out_tx: mpsc::Sender<ServerMsg>,
    room: Option<RoomHandle>,
    forwarder: Option<JoinHandle<()>>,
}

impl Session {
    /// Route a room's events to this connection, replacing any earlier room
    fn attach(&mut self, handle: RoomHandle) {
        self.detach();
        let events = handle.subscribe();
        self.forwarder = Some(tokio::spawn(forward_room_events(
            self.identity.user_id.clone(),
            events,
            self.out_tx.clone(),
        )));
        self.room = Some(handle);
    }

    fn detach(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        self.room = None;
    }

    async fn reply(&self, msg: ServerMsg) {
        if self.out_tx.send(msg).await.is_err() {
            debug!(user_id = %self.identity.user_id, "Writer gone, reply dropped");
        }
    }

    async fn handle(&mut self, msg: ClientMsg) {
        let user_id = self.identity.user_id.clone();
        match msg {
            ClientMsg::JoinRoom {
                room_id,
                char_type,
                mode,
            } => {
                let joined = self
                    .state
                    .lobby
                    .join_room(&self.identity, &room_id, char_type, mode)
                    .await;
                match joined {
                    Ok(handle) => {
                        self.attach(handle);
                        self.reply(ServerMsg::RoomJoined { room_id }).await;
                    }
                    Err(e) => self.reply(ServerMsg::error(e.code(), &e)).await,
                }
            }
            ClientMsg::StartGame => {
                if let Err(e) = self.state.lobby.start_room(&user_id).await {
                    self.reply(ServerMsg::error(e.code(), &e)).await;
                }
            }
            ClientMsg::LeaveRoom => {
                self.detach();
                if let Err(e) = self.state.lobby.leave_room(&user_id).await {
                    self.reply(ServerMsg::error(e.code(), &e)).await;
                }
            }
            ClientMsg::Ping { t } => self.reply(ServerMsg::Pong { t }).await,
            ClientMsg::Move { velocity } => {
                self.send_to_room(RoomCommand::Move { user_id, velocity })
                    .await
            }
            ClientMsg::UseItem => self.send_to_room(RoomCommand::UseItem { user_id }).await,
            ClientMsg::UseSkill => self.send_to_room(RoomCommand::UseSkill { user_id }).await,
            ClientMsg::Steal => self.send_to_room(RoomCommand::Steal { user_id }).await,
        }
    }

    async fn send_to_room(&self, command: RoomCommand) {
        match &self.room {
            Some(handle) => handle.send(command).await,
            None => debug!(user_id = %self.identity.user_id, "Room input without a room, ignored"),
        }
    }
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, identity: Identity, state: AppState) {
    let user_id = identity.user_id.clone();
    info!(user_id = %user_id, "New WebSocket connection");

    let (ws_sink, mut ws_stream) = socket.split();
    let (out_tx, out_rx) = mpsc::channel::<ServerMsg>(64);
    let writer = tokio::spawn(write_loop(user_id.clone(), ws_sink, out_rx));

    let rejoined = state.lobby.reconnect(&user_id);
    let welcome = ServerMsg::Welcome {
        user_id: identity.user_id.clone(),
        nick_name: identity.display_name.clone(),
        is_guest: identity.is_guest,
        room_id: rejoined.as_ref().map(|h| h.room_id.clone()),
    };

    let mut session = Session {
        identity,
        state: state.clone(),
        out_tx,
        room: None,
        forwarder: None,
    };
    session.reply(welcome).await;
    if let Some(handle) = rejoined {
        info!(user_id = %user_id, room_id = %handle.room_id, "Reconnected to running room");
        session.attach(handle);
    }

    let rate_limiter = ConnectionRateLimiter::new();

    // Reader loop: WebSocket -> lobby / room task
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check() {
                    warn!(user_id = %user_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => session.handle(client_msg).await,
                    Err(e) => {
                        debug!(user_id = %user_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                debug!(user_id = %user_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(user_id = %user_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    session.detach();
    state.lobby.disconnect(&user_id).await;

    // dropping the last sender lets the writer drain and exit
    drop(session);
    let _ = writer.await;

    info!(user_id = %user_id, "WebSocket connection closed");
}

/// Forward room broadcasts into the connection's outbound queue
async fn forward_room_events(
    user_id: String,
    mut events: broadcast::Receiver<RoomEvent>,
    out_tx: mpsc::Sender<ServerMsg>,
) {
    loop {
        let msg = match events.recv().await {
            Ok(RoomEvent::State(snapshot)) => ServerMsg::GameState(snapshot),
            Ok(RoomEvent::GameOver(report)) => ServerMsg::GameOver(report),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(user_id = %user_id, lagged_count = n, "Client lagged, skipping snapshots");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(user_id = %user_id, "Room event channel closed");
                break;
            }
        };

        if out_tx.send(msg).await.is_err() {
            break;
        }
    }
}

/// Serialize outbound messages onto the socket
async fn write_loop(
    user_id: String,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<ServerMsg>,
) {
    while let Some(msg) = out_rx.recv().await {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            debug!(user_id = %user_id, error = %e, "WebSocket send failed");
            break;
        }
    }
    let _ = ws_sink.close().await;
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
