//! terramap-widget — renders a resolved map to a standalone HTML document.
//!
//! The document is a self-contained Leaflet page: CDN assets, one tile
//! layer per map layer, a legend carrying each layer's dataset id and
//! color ramp, and only the UI controls the map spec asks for.

pub mod views;

use askama::Template;
use thiserror::Error;

use terra_core::MapSpec;

use crate::views::{LayerView, LegendView, center_js};

/// Presentation options orthogonal to the map itself.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub title: String,
    /// CSS width of the map element.
    pub width: String,
    /// Height of the map element in pixels.
    pub height_px: u32,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            title: "My Map".to_string(),
            width: "100%".to_string(),
            height_px: 300,
        }
    }
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("{layers} layers but {tiles} tile sources")]
    LayerMismatch { layers: usize, tiles: usize },

    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "widget.html")]
struct WidgetTemplate {
    title: String,
    width: String,
    height: String,
    center: String,
    zoom: u8,
    zoom_control: bool,
    attribution_control: bool,
    fullscreen_control: bool,
    scale_control: bool,
    layer_control: bool,
    layers: Vec<LayerView>,
    legend: Vec<LegendView>,
}

/// Render a map and its per-layer tile URL templates to HTML.
///
/// `tile_urls` must line up index-for-index with `spec.layers`, the way
/// the platform client's resolve step returns them.
pub fn render_widget(
    spec: &MapSpec,
    tile_urls: &[String],
    options: &WidgetOptions,
) -> Result<String, WidgetError> {
    if spec.layers.len() != tile_urls.len() {
        return Err(WidgetError::LayerMismatch {
            layers: spec.layers.len(),
            tiles: tile_urls.len(),
        });
    }

    let layers = spec
        .layers
        .iter()
        .zip(tile_urls)
        .map(|(layer, url)| LayerView::new(layer, url))
        .collect();
    let legend = spec.layers.iter().map(LegendView::new).collect();

    let template = WidgetTemplate {
        title: options.title.clone(),
        width: options.width.clone(),
        height: format!("{}px", options.height_px),
        center: center_js(spec),
        zoom: spec.zoom,
        zoom_control: spec.controls.zoom,
        attribution_control: spec.controls.attribution,
        fullscreen_control: spec.controls.fullscreen,
        scale_control: spec.controls.scale,
        layer_control: spec.controls.layer_list,
        layers,
        legend,
    };

    Ok(template.render()?)
}
