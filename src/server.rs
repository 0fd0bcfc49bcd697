//////////////////////////
// server.rs
//////////////////////////

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;
use warp::ws::{Message, WebSocket, Ws};
use warp::Filter;

use crate::session::GameSession;
use crate::types::{ClientMessage, Role, ServerMessage, SlotUnavailable};

/// What happens to a connection once both player seats are held.
///
/// `RefuseExtra` is the product default: every extra connection (third,
/// fourth, or later) is told the game is full and dropped, until a seat
/// frees up again. `AllowSpectators` admits extras as read-only watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatPolicy {
    RefuseExtra,
    AllowSpectators,
}

pub type Outbound = mpsc::UnboundedSender<Message>;

struct Connection {
    role: Role,
    tx: Outbound,
}

/// Maps connection ids to roles and outbound channels. Invariant: at
/// most one connection holds White and at most one holds Black.
pub struct Registry {
    policy: SeatPolicy,
    connections: HashMap<Uuid, Connection>,
}

impl Registry {
    pub fn new(policy: SeatPolicy) -> Self {
        Registry {
            policy,
            connections: HashMap::new(),
        }
    }

    fn seat_taken(&self, role: Role) -> bool {
        self.connections.values().any(|conn| conn.role == role)
    }

    /// Assign a role to a new connection: first free player seat wins,
    /// extras fall to the seat policy.
    pub fn admit(&mut self, id: Uuid, tx: Outbound) -> Result<Role, SlotUnavailable> {
        let role = if !self.seat_taken(Role::White) {
            Role::White
        } else if !self.seat_taken(Role::Black) {
            Role::Black
        } else {
            match self.policy {
                SeatPolicy::AllowSpectators => Role::Spectator,
                SeatPolicy::RefuseExtra => return Err(SlotUnavailable),
            }
        };
        self.connections.insert(id, Connection { role, tx });
        Ok(role)
    }

    /// Free the connection's seat. The board is untouched; the next
    /// connection may claim the vacated color mid-game.
    pub fn release(&mut self, id: &Uuid) -> Option<Role> {
        self.connections.remove(id).map(|conn| conn.role)
    }

    pub fn role_of(&self, id: &Uuid) -> Option<Role> {
        self.connections.get(id).map(|conn| conn.role)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Fan a message out to every connection, the originator included;
    /// clients reconcile from the authoritative echo. Connections whose
    /// channel has gone away are dropped on the spot.
    pub fn broadcast(&mut self, msg: &ServerMessage) {
        let text = serde_json::to_string(msg).unwrap();
        self.connections
            .retain(|_, conn| conn.tx.send(Message::text(text.clone())).is_ok());
    }
}

struct ServerState {
    registry: Registry,
    session: GameSession,
}

type Shared = Arc<Mutex<ServerState>>;

fn send(tx: &Outbound, msg: &ServerMessage) {
    let _ = tx.send(Message::text(serde_json::to_string(msg).unwrap()));
}

async fn handle_connection(ws: WebSocket, state: Shared) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let client_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Writer task: sole owner of the socket's sink. Everything outbound,
    // direct replies and broadcasts alike, goes through the channel, so
    // the state lock is never held across socket I/O.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let admitted = {
        let mut state = state.lock().await;
        match state.registry.admit(client_id, tx.clone()) {
            Ok(role) => {
                info!("client {} connected as {}", client_id, role);
                let hello = ServerMessage::Assigned {
                    player: role,
                    game_state: state.session.snapshot(),
                };
                send(&tx, &hello);
                true
            }
            Err(SlotUnavailable) => {
                info!("client {} refused, both player slots taken", client_id);
                let notice = ServerMessage::GameFull {
                    message: "Game is full! Only 2 players allowed.".to_string(),
                };
                send(&tx, &notice);
                false
            }
        }
    };

    if admitted {
        while let Some(result) = ws_rx.next().await {
            let msg = match result {
                Ok(m) => m,
                Err(e) => {
                    warn!("websocket error for client {}: {}", client_id, e);
                    break;
                }
            };
            // Non-text frames and unparseable payloads are dropped, the
            // connection stays up.
            let text = match msg.to_str() {
                Ok(s) => s,
                Err(_) => continue,
            };
            let intent: ClientMessage = match serde_json::from_str(text) {
                Ok(c) => c,
                Err(_) => continue,
            };
            dispatch(client_id, intent, &state).await;
        }

        let mut state = state.lock().await;
        if let Some(role) = state.registry.release(&client_id) {
            info!("client {} ({}) disconnected, seat freed", client_id, role);
        }
    }

    // Dropping the last sender ends the writer, which closes the socket.
    drop(tx);
    let _ = writer.await;
}

async fn dispatch(client_id: Uuid, intent: ClientMessage, state: &Shared) {
    match intent {
        ClientMessage::Move {
            from_row,
            from_col,
            to_row,
            to_col,
        } => {
            let mut state = state.lock().await;
            let role = match state.registry.role_of(&client_id) {
                Some(role) => role,
                None => return,
            };
            match state
                .session
                .request_move(role, (from_row, from_col), (to_row, to_col))
            {
                Ok(()) => {
                    if let Some(outcome) = state.session.outcome() {
                        info!("game over: {}", outcome);
                    }
                    let snapshot = state.session.snapshot();
                    let update = ServerMessage::GameState {
                        board: snapshot.board,
                        current_player: snapshot.current_player,
                    };
                    state.registry.broadcast(&update);
                }
                Err(e) => {
                    debug!("move from client {} rejected: {}", client_id, e);
                }
            }
        }
        ClientMessage::Reset => {
            let mut state = state.lock().await;
            state.session.reset();
            info!("game reset by client {}", client_id);
            let update = ServerMessage::GameReset {
                game_state: state.session.snapshot(),
            };
            state.registry.broadcast(&update);
        }
    }
}

/// Serve the WebSocket endpoint at `ws://{addr}/chess` until ctrl-c.
pub async fn start_server(addr: SocketAddr, policy: SeatPolicy) {
    let state: Shared = Arc::new(Mutex::new(ServerState {
        registry: Registry::new(policy),
        session: GameSession::new(),
    }));

    let state = warp::any().map(move || state.clone());

    let routes = warp::path("chess")
        .and(warp::ws())
        .and(state)
        .map(|ws: Ws, state: Shared| {
            ws.on_upgrade(move |socket| handle_connection(socket, state))
        });

    info!("listening on ws://{}/chess", addr);
    let (_, serving) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    });
    serving.await;
}
