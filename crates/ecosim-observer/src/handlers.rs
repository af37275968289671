//! Read-only REST handlers for the Observer server.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/api/status` | Tick, counts, and last tick summary |
//! | `GET` | `/api/population` | Live counts per role |
//! | `GET` | `/api/raster` | Current RGBA frame as raw bytes |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};

use crate::error::ObserverError;
use crate::state::AppState;

/// Response header carrying the raster width.
pub const RASTER_WIDTH_HEADER: &str = "x-raster-width";

/// Response header carrying the raster height.
pub const RASTER_HEIGHT_HEADER: &str = "x-raster-height";

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the current tick, counts, and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let name = snapshot.world_name.clone();
    let tick = snapshot.tick;
    let grazers = snapshot.population.grazers;
    let predators = snapshot.population.predators;
    let hunters = snapshot.population.hunters;
    let ceiling = snapshot.population_ceiling;
    let width = snapshot.width;
    let height = snapshot.height;
    drop(snapshot);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Ecosim Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #3fb950; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 110px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Ecosim Observer</h1>
    <p>{name} &middot; {width}x{height}</p>
    <div>
        <div class="metric"><div class="label">Tick</div><div class="value">{tick}</div></div>
        <div class="metric"><div class="label">Grazers</div><div class="value">{grazers}</div></div>
        <div class="metric"><div class="label">Predators</div><div class="value">{predators}</div></div>
        <div class="metric"><div class="label">Hunters</div><div class="value">{hunters}</div></div>
        <div class="metric"><div class="label">Ceiling</div><div class="value">{ceiling}</div></div>
    </div>
    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/status">/api/status</a></li>
        <li>GET <a href="/api/population">/api/population</a></li>
        <li>GET <a href="/api/raster">/api/raster</a> (RGBA bytes)</li>
        <li>GET <a href="/api/operator/status">/api/operator/status</a></li>
        <li>POST /api/operator/speed</li>
        <li>POST /api/operator/stop</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Return the full snapshot minus the raster bytes.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    Ok(Json(serde_json::to_value(&*snapshot)?))
}

// ---------------------------------------------------------------------------
// GET /api/population
// ---------------------------------------------------------------------------

/// Return live counts per role plus the total and ceiling.
pub async fn get_population(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(serde_json::json!({
        "tick": snapshot.tick,
        "grazers": snapshot.population.grazers,
        "predators": snapshot.population.predators,
        "hunters": snapshot.population.hunters,
        "total": snapshot.population.total(),
        "ceiling": snapshot.population_ceiling,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/raster
// ---------------------------------------------------------------------------

/// Return the current frame as row-major RGBA bytes.
///
/// Dimensions travel in the [`RASTER_WIDTH_HEADER`] and
/// [`RASTER_HEIGHT_HEADER`] response headers.
pub async fn get_raster(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    if snapshot.raster.is_empty() {
        return Err(ObserverError::NotFound("no raster frame published yet".to_owned()));
    }
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
        (header::HeaderName::from_static(RASTER_WIDTH_HEADER), snapshot.width.to_string()),
        (header::HeaderName::from_static(RASTER_HEIGHT_HEADER), snapshot.height.to_string()),
    ];
    Ok((headers, snapshot.raster.clone()))
}
