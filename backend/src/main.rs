use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;

use sketch_core::geometry::Point2;
use sketch_core::sketch::solver::{solve, SolveOutcome};
use sketch_core::sketch::types::{
    ArcId, Axis, DimensionId, LineId, PointId, Sketch, SketchResult,
};

/// Format an error as a JSON message for the frontend
fn format_error(code: &str, message: &str) -> String {
    format!(
        "ERROR_UPDATE:{}",
        json!({
            "code": code,
            "message": message,
        })
    )
}

// Application State
struct AppState {
    sketch: Arc<RwLock<Sketch>>,
}

/// One sketch edit, as sent by the frontend. Every applied edit triggers a
/// full re-solve before the next render.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum EditCommand {
    AddPoint { x: f64, y: f64 },
    MovePoint { point: PointId, x: f64, y: f64 },
    AddLine { a: PointId, b: PointId },
    AddArc { center: PointId, a: PointId, b: PointId },
    AddFixed { point: PointId, x: f64, y: f64 },
    AddAxisAligned { axis: Axis, a: PointId, b: PointId },
    AddPointPointDistance { a: PointId, b: PointId, distance: f64 },
    AddPointLineDistance { point: PointId, line: LineId, distance: f64 },
    AddPointOnLine { point: PointId, line: LineId },
    AddPointOnArc { point: PointId, arc: ArcId },
    SetDimension { dimension: DimensionId, value: f64 },
    RemovePoint { point: PointId },
    RemoveDimension { dimension: DimensionId },
}

fn apply_command(sketch: &mut Sketch, command: EditCommand) -> SketchResult<()> {
    match command {
        EditCommand::AddPoint { x, y } => {
            sketch.add_point(Point2::new(x, y));
            Ok(())
        }
        EditCommand::MovePoint { point, x, y } => sketch.move_point(point, Point2::new(x, y)),
        EditCommand::AddLine { a, b } => sketch.add_line(a, b).map(|_| ()),
        EditCommand::AddArc { center, a, b } => sketch.add_arc(center, a, b).map(|_| ()),
        EditCommand::AddFixed { point, x, y } => sketch.add_fixed(point, Point2::new(x, y)),
        EditCommand::AddAxisAligned { axis, a, b } => sketch.add_axis_aligned(axis, a, b),
        EditCommand::AddPointPointDistance { a, b, distance } => {
            sketch.add_point_point_distance(a, b, distance).map(|_| ())
        }
        EditCommand::AddPointLineDistance {
            point,
            line,
            distance,
        } => sketch
            .add_point_line_distance(point, line, distance)
            .map(|_| ()),
        EditCommand::AddPointOnLine { point, line } => sketch.add_point_on_line(point, line),
        EditCommand::AddPointOnArc { point, arc } => sketch.add_point_on_arc(point, arc),
        EditCommand::SetDimension { dimension, value } => {
            sketch.set_dimension_value(dimension, value)
        }
        EditCommand::RemovePoint { point } => sketch.remove_point(point),
        EditCommand::RemoveDimension { dimension } => sketch.remove_dimension(dimension),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let shared_state = Arc::new(AppState {
        sketch: Arc::new(RwLock::new(Sketch::with_origin())),
    });

    // build our application with a route
    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn root() -> &'static str {
    "Hello from Sketch Backend!"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

fn solve_update_message(outcome: &SolveOutcome) -> String {
    format!(
        "SOLVE_UPDATE:{}",
        json!({
            "resolved": outcome.resolved,
            "passes": outcome.passes,
            "facts": outcome.fact_count,
        })
    )
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");

    // Send the initial sketch and its solution.
    {
        let (sketch_json, solve_msg) = {
            let sketch = state.sketch.read().unwrap();
            let outcome = solve(&sketch);
            (
                serde_json::to_string(&*sketch).unwrap_or("{}".to_string()),
                solve_update_message(&outcome),
            )
        };
        if socket
            .send(Message::Text(format!("SKETCH_UPDATE:{}", sketch_json)))
            .await
            .is_err()
        {
            return;
        }
        if socket.send(Message::Text(solve_msg)).await.is_err() {
            return;
        }
    }

    while let Some(msg) = socket.recv().await {
        let msg = if let Ok(msg) = msg {
            msg
        } else {
            return;
        };

        if let Message::Text(text) = msg {
            info!("Received message: {}", text);

            let command: EditCommand = match serde_json::from_str(&text) {
                Ok(command) => command,
                Err(err) => {
                    let reply = format_error("BAD_COMMAND", &err.to_string());
                    if socket.send(Message::Text(reply)).await.is_err() {
                        return;
                    }
                    continue;
                }
            };

            // Apply the edit, re-solve the whole sketch, and store the
            // solved snapshot so the next edit starts from it.
            let reply = {
                let mut sketch = state.sketch.write().unwrap();
                match apply_command(&mut sketch, command) {
                    Ok(()) => {
                        let outcome = solve(&sketch);
                        *sketch = outcome.sketch.clone();
                        let sketch_json =
                            serde_json::to_string(&*sketch).unwrap_or("{}".to_string());
                        vec![
                            format!("SKETCH_UPDATE:{}", sketch_json),
                            solve_update_message(&outcome),
                        ]
                    }
                    Err(err) => vec![format_error("BAD_REFERENCE", &err.to_string())],
                }
            };

            for message in reply {
                if socket.send(Message::Text(message)).await.is_err() {
                    return;
                }
            }
        }
    }
}
