//! Axum web server with WebSocket streaming for playback control.

use std::sync::Arc;

use algoscope_graph::{
    check_compatibility, compatible_algorithms, compatible_generators, Compatibility, GeneratorType, Graph,
    GraphAlgorithm,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{broadcast, RwLock};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::VisConfig;
use crate::display::DisplayState;
use crate::driver::AutoPlayer;
use crate::error::{Error, Result};
use crate::playback::{PlaybackSession, PlaybackStatus};
use crate::runner::{self, RunRequest};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_rejection() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Shared application state.
pub struct AppState {
    player: AutoPlayer,
    config: VisConfig,
    graph: RwLock<Option<Graph>>,
}

impl AppState {
    pub fn new(config: VisConfig) -> Self {
        Self {
            player: AutoPlayer::new(PlaybackSession::new(config.playback)),
            config,
            graph: RwLock::new(None),
        }
    }

    pub fn player(&self) -> &AutoPlayer {
        &self.player
    }

    /// Produce the requested stream and make it the current one.
    pub async fn run(&self, request: &RunRequest) -> Result<PlaybackStatus> {
        let run = runner::build(request, self.config.seed)?;
        *self.graph.write().await = run.graph;
        Ok(self.player.load(run.stream, run.initial).await)
    }
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    pub fn new(state: AppState) -> Self {
        Self { state: Arc::new(state) }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/display", get(display_handler))
            .route("/api/graph", get(graph_handler))
            .route("/api/compatibility", get(compatibility_handler))
            .route("/api/run", post(run_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/step", post(step_handler))
            .route("/api/playback/seek", post(seek_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Playback server running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.status().await)
}

async fn display_handler(State(state): State<Arc<AppState>>) -> Json<Option<DisplayState>> {
    let session = state.player.session().read().await;
    Json(session.display().cloned())
}

async fn graph_handler(State(state): State<Arc<AppState>>) -> Json<Option<Graph>> {
    Json(state.graph.read().await.clone())
}

#[derive(Debug, Deserialize)]
struct CompatibilityQuery {
    algorithm: String,
    generator: GeneratorType,
}

#[derive(Debug, Serialize)]
struct CompatibilityResponse {
    #[serde(flatten)]
    check: Compatibility,
    /// Generators the algorithm accepts.
    generators: Vec<GeneratorType>,
    /// Algorithms the generator accepts.
    algorithms: Vec<GraphAlgorithm>,
}

async fn compatibility_handler(Query(query): Query<CompatibilityQuery>) -> Json<CompatibilityResponse> {
    Json(CompatibilityResponse {
        check: check_compatibility(&query.algorithm, query.generator),
        generators: compatible_generators(&query.algorithm),
        algorithms: compatible_algorithms(query.generator),
    })
}

async fn run_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Result<Json<PlaybackStatus>> {
    Ok(Json(state.run(&request).await?))
}

async fn play_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.play().await)
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.pause().await)
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    Json(state.player.reset().await)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Direction {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: Direction,
}

async fn step_handler(State(state): State<Arc<AppState>>, Json(req): Json<StepRequest>) -> Json<PlaybackStatus> {
    match req.direction {
        Direction::Forward => Json(state.player.step().await),
        Direction::Backward => Json(state.player.step_backward().await),
    }
}

#[derive(Deserialize)]
struct SeekRequest {
    frame: usize,
}

async fn seek_handler(State(state): State<Arc<AppState>>, Json(req): Json<SeekRequest>) -> Json<PlaybackStatus> {
    Json(state.player.seek(req.frame).await)
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed_ms: u64,
}

async fn speed_handler(State(state): State<Arc<AppState>>, Json(req): Json<SpeedRequest>) -> Json<PlaybackStatus> {
    Json(state.player.set_speed(req.speed_ms).await)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Frame text for `response`. A response that cannot be encoded is replaced
/// by an error frame naming the failure.
fn encode(response: &impl Serialize) -> String {
    match serde_json::to_string(response) {
        Ok(json) => json,
        Err(err) => {
            warn!(%err, "failed to encode websocket response");
            let message = format!("failed to encode response: {err}");
            serde_json::to_string(&WsResponse::Error { message })
                .unwrap_or_else(|_| String::from(r#"{"type":"error","message":"failed to encode response"}"#))
        }
    }
}

/// Returns false once the client is gone.
async fn send(socket: &mut WebSocket, response: &WsResponse) -> bool {
    socket.send(Message::Text(encode(response).into())).await.is_ok()
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut updates = state.player.subscribe();

    let initial = WsResponse::Status(state.player.status().await);
    if !send(&mut socket, &initial).await {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let response = match serde_json::from_str::<WsCommand>(&text) {
                            Ok(cmd) => handle_ws_command(&state, cmd).await,
                            Err(err) => WsResponse::Error { message: err.to_string() },
                        };
                        if !send(&mut socket, &response).await {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            update = updates.recv() => match update {
                Ok(status) => {
                    if !send(&mut socket, &WsResponse::Status(status)).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetStatus,
    GetDisplay,
    Run { request: RunRequest },
    Play,
    Pause,
    Reset,
    Step { direction: Direction },
    Seek { frame: usize },
    Speed { speed_ms: u64 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Status(PlaybackStatus),
    Display { display: Option<DisplayState> },
    Error { message: String },
}

async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> WsResponse {
    let player = &state.player;
    let status = match cmd {
        WsCommand::GetStatus => player.status().await,
        WsCommand::GetDisplay => {
            let session = player.session().read().await;
            return WsResponse::Display { display: session.display().cloned() };
        }
        WsCommand::Run { request } => match state.run(&request).await {
            Ok(status) => status,
            Err(err) => return WsResponse::Error { message: err.to_string() },
        },
        WsCommand::Play => player.play().await,
        WsCommand::Pause => player.pause().await,
        WsCommand::Reset => player.reset().await,
        WsCommand::Step { direction: Direction::Forward } => player.step().await,
        WsCommand::Step { direction: Direction::Backward } => player.step_backward().await,
        WsCommand::Seek { frame } => player.seek(frame).await,
        WsCommand::Speed { speed_ms } => player.set_speed(speed_ms).await,
    };
    WsResponse::Status(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackMode;
    use algoscope_steps::sorting::SortAlgorithm;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(VisConfig::default()))
    }

    fn sorting(input: &[i64]) -> RunRequest {
        RunRequest::Sorting { algorithm: SortAlgorithm::Bubble, input: input.to_vec() }
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no wire form"))
        }
    }

    #[test]
    fn encode_failure_becomes_error_frame() {
        let frame: serde_json::Value = serde_json::from_str(&encode(&Unencodable)).unwrap();
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["message"], "failed to encode response: no wire form");
    }

    #[test]
    fn error_frame_matches_response_shape() {
        let response = WsResponse::Error { message: "x".into() };
        let direct: serde_json::Value = serde_json::from_str(&encode(&response)).unwrap();
        assert_eq!(direct, json!({ "type": "error", "message": "x" }));
    }

    #[test]
    fn router_builds() {
        let server = VisServer::new(AppState::new(VisConfig::default()));
        let _router = server.router();
        let status = tokio_test::block_on(server.state().player().status());
        assert_eq!(status.mode, PlaybackMode::Idle);
    }

    #[tokio::test]
    async fn run_then_step() {
        let state = state();
        let Json(status) = run_handler(State(state.clone()), Json(sorting(&[3, 1, 2]))).await.unwrap();
        assert_eq!(status.mode, PlaybackMode::Ready);
        assert!(status.total_steps > 0);

        let Json(status) = step_handler(State(state.clone()), Json(StepRequest { direction: Direction::Forward })).await;
        assert_eq!(status.cursor, 1);
        let Json(status) =
            step_handler(State(state.clone()), Json(StepRequest { direction: Direction::Backward })).await;
        assert_eq!(status.cursor, 0);

        let Json(display) = display_handler(State(state)).await;
        assert!(matches!(display, Some(DisplayState::Array(_))));
    }

    #[tokio::test]
    async fn rejected_run_is_bad_request() {
        let request: RunRequest = serde_json::from_value(json!({
            "category": "graph",
            "algorithm": "topological-sort",
            "generator": "complete",
            "num_nodes": 5,
        }))
        .unwrap();
        let err = run_handler(State(state()), Json(request)).await.unwrap_err();
        assert_eq!(err.to_string(), "complete graphs are incompatible with topological-sort");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn graph_run_exposes_graph() {
        let state = state();
        let request: RunRequest = serde_json::from_value(json!({
            "category": "graph",
            "algorithm": "dijkstra",
            "generator": "weighted-random",
            "num_nodes": 6,
        }))
        .unwrap();
        run_handler(State(state.clone()), Json(request)).await.unwrap();
        let Json(graph) = graph_handler(State(state.clone())).await;
        assert_eq!(graph.map(|g| g.node_count()), Some(6));

        run_handler(State(state.clone()), Json(sorting(&[1]))).await.unwrap();
        let Json(graph) = graph_handler(State(state)).await;
        assert!(graph.is_none());
    }

    #[tokio::test]
    async fn compatibility_lists_both_directions() {
        let query = CompatibilityQuery { algorithm: "bellman-ford".into(), generator: GeneratorType::Tree };
        let Json(response) = compatibility_handler(Query(query)).await;
        assert!(!response.check.compatible);
        assert!(!response.generators.contains(&GeneratorType::Tree));
        assert!(!response.algorithms.contains(&GraphAlgorithm::BellmanFord));
        assert!(response.algorithms.contains(&GraphAlgorithm::Bfs));
    }

    #[tokio::test]
    async fn ws_commands_drive_the_same_session() {
        let state = state();
        let cmd: WsCommand = serde_json::from_value(json!({
            "type": "run",
            "request": { "category": "sorting", "algorithm": "bubble", "input": [2, 1] },
        }))
        .unwrap();
        assert!(matches!(handle_ws_command(&state, cmd).await, WsResponse::Status(_)));

        let cmd: WsCommand = serde_json::from_str(r#"{"type":"seek","frame":1000}"#).unwrap();
        match handle_ws_command(&state, cmd).await {
            WsResponse::Status(status) => {
                assert_eq!(status.cursor, status.total_steps);
                assert_eq!(status.mode, PlaybackMode::Finished);
            }
            other => panic!("{other:?}"),
        }
    }

    #[tokio::test]
    async fn ws_run_error_is_reported() {
        let cmd: WsCommand = serde_json::from_value(json!({
            "type": "run",
            "request": {
                "category": "graph",
                "algorithm": "topological-sort",
                "generator": "tree",
                "num_nodes": 5,
            },
        }))
        .unwrap();
        assert!(matches!(handle_ws_command(&state(), cmd).await, WsResponse::Error { .. }));
    }
}
