use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{Greeting, STATISTICS_PATH};

/// Routes of the stub API. Stateless; every answer is a constant.
pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route(STATISTICS_PATH, get(statistics))
        .layer(TraceLayer::new_for_http())
}

async fn home() -> Json<Greeting> {
    Json(Greeting {
        message: "🌍 Silicic Earth API".to_string(),
        status: "online".to_string(),
    })
}

// Both zeros go out as integers.
async fn statistics() -> Json<Value> {
    Json(json!({
        "total_evaluaciones": 0,
        "puntuacion_promedio": 0,
    }))
}
