use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use pacman_round_engine::autopilot::Autopilot;
use pacman_round_engine::config::SimulationConfig;
use pacman_round_engine::engine::GameEngine;
use pacman_round_engine::error::Result;
use pacman_round_engine::input::{HeldKeys, InputSource};
use pacman_round_engine::maze::Maze;
use pacman_round_engine::scoreboard::Scoreboard;
use pacman_round_engine::server_protocol::{
    parse_client_message, sanitize_name, ParsedClientMessage,
};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone)]
struct ClientContext {
    tx: mpsc::Sender<String>,
    name: Option<String>,
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    /// Client steering the player; the autopilot drives while this is empty.
    controller_id: Option<String>,
    held: HeldKeys,
    autopilot: Autopilot,
    config: SimulationConfig,
    maze: Maze,
    game: GameEngine,
    scoreboard: Scoreboard,
    game_over_sent: bool,
}

impl ServerState {
    fn new(config: SimulationConfig, maze: Maze) -> Result<Self> {
        let game = GameEngine::new(config.clone(), maze.clone())?;
        Ok(Self {
            clients: HashMap::new(),
            controller_id: None,
            held: HeldKeys::default(),
            autopilot: Autopilot::new(config.seed.rotate_left(16)),
            scoreboard: Scoreboard::new(&config),
            config,
            maze,
            game,
            game_over_sent: false,
        })
    }

    fn restart(&mut self, seed: u32) -> Result<()> {
        self.config.seed = seed;
        self.game = GameEngine::new(self.config.clone(), self.maze.clone())?;
        self.scoreboard = Scoreboard::new(&self.config);
        self.autopilot = Autopilot::new(seed.rotate_left(16));
        self.held = HeldKeys::default();
        self.game_over_sent = false;
        info!(seed, "round restarted");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let state = match load_server_state() {
        Ok(state) => Arc::new(Mutex::new(state)),
        Err(err) => {
            error!(error = %err, "failed to set up round");
            std::process::exit(2);
        }
    };
    let period = tick_interval(state.lock().await.config.fps);
    info!(period_ms = period.as_secs_f64() * 1000.0, "tick loop starting");
    start_tick_loop(state.clone(), period);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.to_string_lossy(), "serving static files");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        warn!("static file root not found; only /healthz and /ws are served");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, addr = %bind_addr, "failed to bind server socket");
            std::process::exit(2);
        }
    };

    info!(port, "listening");
    if let Err(err) = axum::serve(listener, app).await {
        error!(error = %err, "server runtime failed");
    }
}

fn load_server_state() -> Result<ServerState> {
    let mut config = match std::env::var("CONFIG_PATH") {
        Ok(path) => SimulationConfig::from_json_file(&PathBuf::from(path))?,
        Err(_) => SimulationConfig::default(),
    };
    config.seed = std::env::var("SEED")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(rand::random::<u32>);
    let maze = match std::env::var("MAZE_PATH") {
        Ok(path) => Maze::load_json_file(&PathBuf::from(path), config.tile_size)?,
        Err(_) => Maze::classic(config.tile_size)?,
    };
    info!(
        seed = config.seed,
        width = maze.width(),
        height = maze.height(),
        pellets = maze.pellet_count(),
        "round ready"
    );
    ServerState::new(config, maze)
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    [PathBuf::from("static"), PathBuf::from("dist/client")]
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<String>(256);

    {
        let mut guard = state.lock().await;
        guard.clients.insert(
            client_id.clone(),
            ClientContext {
                tx: tx.clone(),
                name: None,
            },
        );
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                let mut guard = state.lock().await;
                handle_client_message(&mut guard, &client_id, raw.as_str());
            }
            Message::Binary(raw) => {
                let mut guard = state.lock().await;
                match std::str::from_utf8(&raw) {
                    Ok(text) => handle_client_message(&mut guard, &client_id, text),
                    Err(_) => send_error(&guard, &client_id, "invalid utf8 message"),
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        disconnect_client(&mut guard, &client_id);
    }
    drop(tx);
    let _ = writer.await;
}

fn handle_client_message(state: &mut ServerState, client_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send_error(state, client_id, "invalid message");
        return;
    };

    match message {
        ParsedClientMessage::Hello { name, spectator } => {
            handle_hello(state, client_id, &name, spectator);
        }
        ParsedClientMessage::Input { dir, held } => {
            if state.controller_id.as_deref() == Some(client_id) {
                state.held.set(dir, held);
            }
        }
        ParsedClientMessage::Restart => {
            let may_restart = state.controller_id.is_none()
                || state.controller_id.as_deref() == Some(client_id);
            if !may_restart {
                send_error(state, client_id, "only the controller can restart");
                return;
            }
            if let Err(err) = state.restart(rand::random::<u32>()) {
                error!(error = %err, "restart failed");
                send_error(state, client_id, "restart failed");
                return;
            }
            let init = state.game.get_round_init();
            broadcast(state, &json!({ "type": "round_init", "init": init }));
        }
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                state,
                client_id,
                &json!({
                    "type": "pong",
                    "t": t,
                    "serverTime": Utc::now().timestamp_millis(),
                }),
            );
        }
    }
}

fn handle_hello(state: &mut ServerState, client_id: &str, name: &str, spectator: bool) {
    let name = sanitize_name(name);
    if let Some(client) = state.clients.get_mut(client_id) {
        client.name = Some(name.clone());
    }

    let is_controller = if !spectator && state.controller_id.is_none() {
        state.controller_id = Some(client_id.to_string());
        state.held = HeldKeys::default();
        true
    } else {
        state.controller_id.as_deref() == Some(client_id)
    };
    info!(client = client_id, %name, is_controller, "client joined");

    send_to_client(
        state,
        client_id,
        &json!({
            "type": "welcome",
            "clientId": client_id,
            "name": name,
            "isController": is_controller,
            "isSpectator": !is_controller,
        }),
    );
    let init = state.game.get_round_init();
    send_to_client(state, client_id, &json!({ "type": "round_init", "init": init }));
}

fn disconnect_client(state: &mut ServerState, client_id: &str) {
    if state.clients.remove(client_id).is_none() {
        return;
    }
    if state.controller_id.as_deref() == Some(client_id) {
        state.controller_id = None;
        state.held = HeldKeys::default();
        info!(client = client_id, "controller left; autopilot takes over");
    }
}

fn tick_interval(fps: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)))
}

fn start_tick_loop(state: SharedState, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_game(&mut guard);
        }
    });
}

fn tick_game(state: &mut ServerState) {
    if state.game_over_sent {
        return;
    }

    let frame_seconds = state.config.frame_seconds();
    let snapshot = {
        let input: &dyn InputSource = if state.controller_id.is_some() {
            &state.held
        } else {
            state.autopilot.think_for(&state.game);
            &state.autopilot
        };
        state.game.step(frame_seconds, input);
        state.game.build_snapshot(true)
    };
    state.scoreboard.record_all(&snapshot.events);

    let message = json!({
        "type": "state",
        "snapshot": snapshot,
        "score": state.scoreboard,
    });
    broadcast(state, &message);

    if state.game.is_ended() {
        let summary = state.game.build_summary();
        info!(
            level = summary.level,
            score = state.scoreboard.score,
            "round over"
        );
        let message = json!({
            "type": "game_over",
            "summary": summary,
            "score": state.scoreboard,
        });
        broadcast(state, &message);
        state.game_over_sent = true;
    }
}

fn send_to_client(state: &ServerState, client_id: &str, message: &Value) {
    if let Some(client) = state.clients.get(client_id) {
        if client.tx.try_send(message.to_string()).is_err() {
            warn!(client = client_id, "outbound queue full; message dropped");
        }
    }
}

/// Sends to every client that has said hello; full queues drop the frame.
fn broadcast(state: &ServerState, message: &Value) {
    let payload = message.to_string();
    for client in state.clients.values() {
        if client.name.is_none() {
            continue;
        }
        let _ = client.tx.try_send(payload.clone());
    }
}

fn send_error(state: &ServerState, client_id: &str, message: &str) {
    send_to_client(
        state,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}
