// Health, stats and the 404 fallback

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use super::iso_timestamp;
use crate::server::AppState;

pub const AVAILABLE_ENDPOINTS: [&str; 7] = [
    "POST /api/openrouter",
    "POST /api/gemini",
    "POST /api/deepseek",
    "POST /api/krea",
    "POST /api/verify-google",
    "GET /api/health",
    "GET /api/stats",
];

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": iso_timestamp(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "operational",
        "apis": {
            "openrouter": !state.config.openrouter_api_key.is_empty(),
            "gemini": !state.config.gemini_api_key.is_empty(),
            "deepseek": !state.config.deepseek_api_key.is_empty()
        },
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "memory": process_memory(),
        "timestamp": iso_timestamp()
    }))
}

fn process_memory() -> Value {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
    match system.process(pid) {
        Some(process) => json!({
            "rss": process.memory(),
            "virtual": process.virtual_memory()
        }),
        None => json!({ "rss": 0, "virtual": 0 }),
    }
}

pub async fn endpoint_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "availableEndpoints": AVAILABLE_ENDPOINTS
        })),
    )
}
