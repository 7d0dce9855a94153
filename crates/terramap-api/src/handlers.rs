//! Widget endpoint handlers.
//!
//! Error bodies are deliberately fixed strings: a failing map program is
//! answered with a uniform 400 and a failing platform with a uniform 502,
//! with the cause kept to the server logs.

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, error, warn};

use terra_core::{
    Controls, LatLon, LayerSpec, MapSpec, VisParams, parse_program, unescape_newlines,
};
use terramap_eo::{EoError, ServiceAccountCredentials};
use terramap_widget::{WidgetOptions, render_widget};

use crate::ApiState;

/// Body of every 400 produced by a rejected map program.
pub const BAD_PROGRAM_MESSAGE: &str = "Bad Request: Your code doesn't work.";
/// Body of every 502 produced by a failing platform call.
pub const PLATFORM_UNAVAILABLE_MESSAGE: &str = "Bad Gateway: Earth data service unavailable.";

const DEFAULT_HEIGHT_PX: u32 = 300;

#[derive(Deserialize)]
pub struct WidgetQuery {
    height: Option<String>,
}

impl WidgetQuery {
    /// Height in pixels; anything unparsable falls back to the default.
    fn height_px(&self) -> u32 {
        self.height
            .as_deref()
            .and_then(|h| h.parse().ok())
            .unwrap_or(DEFAULT_HEIGHT_PX)
    }
}

#[derive(Deserialize)]
pub struct CodeForm {
    code: Option<String>,
}

// ── Variant A: map program ──────────────────────────────────────

/// POST /get_map_widget?height=<px>
///
/// The `code` form field holds a map program, with line breaks optionally
/// encoded as literal `\n` sequences.
pub async fn map_widget(
    State(state): State<ApiState>,
    Query(query): Query<WidgetQuery>,
    Form(form): Form<CodeForm>,
) -> Response {
    let code = unescape_newlines(&form.code.unwrap_or_default());

    let spec = match parse_program(&code) {
        Ok(spec) => spec,
        Err(e) => {
            debug!(error = %e, "map program rejected");
            return bad_program();
        }
    };
    if let Err(e) = spec.validate() {
        debug!(error = %e, "map spec rejected");
        return bad_program();
    }

    resolve_and_render(&state, &spec, query.height_px()).await
}

// ── Variant B: fixed demo ───────────────────────────────────────

/// GET /get_map_widget
///
/// Elevation over the Indian subcontinent; doubles as a credential smoke
/// test since it exercises the full platform path with no client input.
pub async fn demo_map_widget(State(state): State<ApiState>) -> Response {
    resolve_and_render(&state, &demo_spec(), DEFAULT_HEIGHT_PX).await
}

/// The fixed demo map: SRTM elevation with a five-stop ramp.
pub fn demo_spec() -> MapSpec {
    MapSpec {
        center: LatLon::new(21.79, 70.87),
        zoom: 3,
        controls: Controls {
            fullscreen: false,
            ..Controls::default()
        },
        layers: vec![LayerSpec {
            dataset: "USGS/SRTMGL1_003".to_string(),
            label: "SRTM".to_string(),
            vis: VisParams {
                min: 0.0,
                max: 6000.0,
                palette: ["006633", "E5FFCC", "662A00", "D8D8D8", "F5F5F5"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                opacity: 1.0,
            },
        }],
    }
}

// ── Shared resolve + render path ────────────────────────────────

async fn resolve_and_render(state: &ApiState, spec: &MapSpec, height_px: u32) -> Response {
    // Fresh credentials per request; nothing auth-related outlives it.
    let credentials = match ServiceAccountCredentials::load(&state.config) {
        Ok(credentials) => credentials,
        Err(e) => return platform_unavailable(&e),
    };

    let sources = match state.client.resolve_map(&credentials, spec).await {
        Ok(sources) => sources,
        Err(e) => return platform_unavailable(&e),
    };
    let tile_urls: Vec<String> = sources.into_iter().map(|s| s.tile_url).collect();

    let options = WidgetOptions {
        height_px,
        ..WidgetOptions::default()
    };
    match render_widget(spec, &tile_urls, &options) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "widget rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn bad_program() -> Response {
    (StatusCode::BAD_REQUEST, BAD_PROGRAM_MESSAGE).into_response()
}

fn platform_unavailable(err: &EoError) -> Response {
    warn!(error = %err, "platform request failed");
    (StatusCode::BAD_GATEWAY, PLATFORM_UNAVAILABLE_MESSAGE).into_response()
}

// ── Liveness ────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}
