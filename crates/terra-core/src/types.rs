//! Shared types describing a map widget.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on layers per map.
pub const MAX_LAYERS: usize = 8;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Raster visualization parameters: value range, color ramp, opacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    /// Color stops as 6-digit hex strings, low value to high value.
    pub palette: Vec<String>,
    pub opacity: f64,
}

impl Default for VisParams {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            palette: vec!["000000".to_string(), "FFFFFF".to_string()],
            opacity: 1.0,
        }
    }
}

/// One raster overlay drawn onto the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Dataset id on the remote platform, e.g. `USGS/SRTMGL1_003`.
    pub dataset: String,
    /// Display label; defaults to the dataset id.
    pub label: String,
    pub vis: VisParams,
}

impl LayerSpec {
    pub fn new(dataset: impl Into<String>) -> Self {
        let dataset = dataset.into();
        Self {
            label: dataset.clone(),
            dataset,
            vis: VisParams::default(),
        }
    }
}

/// Visibility of the widget's UI controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub zoom: bool,
    pub fullscreen: bool,
    pub scale: bool,
    pub attribution: bool,
    pub layer_list: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            zoom: true,
            fullscreen: true,
            scale: false,
            attribution: true,
            layer_list: false,
        }
    }
}

/// A fully described map widget: what a map program evaluates to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    pub center: LatLon,
    pub zoom: u8,
    pub controls: Controls,
    pub layers: Vec<LayerSpec>,
}

impl Default for MapSpec {
    fn default() -> Self {
        Self {
            center: LatLon::new(20.0, 0.0),
            zoom: 2,
            controls: Controls::default(),
            layers: Vec::new(),
        }
    }
}

/// A constraint violation in an otherwise well-formed map description.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude {0} out of range [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} out of range [-180, 180]")]
    Longitude(f64),

    #[error("zoom {0} out of range [0, 24]")]
    Zoom(u8),

    #[error("{0} layers exceeds the limit of {MAX_LAYERS}")]
    TooManyLayers(usize),

    #[error("invalid dataset id {0:?}")]
    InvalidDataset(String),

    #[error("invalid palette color {0:?}")]
    InvalidColor(String),

    #[error("palette has no color stops")]
    EmptyPalette,

    #[error("empty value range: min {min} is not below max {max}")]
    EmptyRange { min: f64, max: f64 },

    #[error("opacity {0} out of range (0, 1]")]
    Opacity(f64),
}

impl MapSpec {
    /// Check every invariant the renderer and the platform client rely on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.center.lat) {
            return Err(ValidationError::Latitude(self.center.lat));
        }
        if !(-180.0..=180.0).contains(&self.center.lon) {
            return Err(ValidationError::Longitude(self.center.lon));
        }
        if self.zoom > 24 {
            return Err(ValidationError::Zoom(self.zoom));
        }
        if self.layers.len() > MAX_LAYERS {
            return Err(ValidationError::TooManyLayers(self.layers.len()));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }
}

impl LayerSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_dataset(&self.dataset) {
            return Err(ValidationError::InvalidDataset(self.dataset.clone()));
        }
        if self.vis.palette.is_empty() {
            return Err(ValidationError::EmptyPalette);
        }
        for color in &self.vis.palette {
            if !is_hex_color(color) {
                return Err(ValidationError::InvalidColor(color.clone()));
            }
        }
        if self.vis.min >= self.vis.max {
            return Err(ValidationError::EmptyRange {
                min: self.vis.min,
                max: self.vis.max,
            });
        }
        if !(self.vis.opacity > 0.0 && self.vis.opacity <= 1.0) {
            return Err(ValidationError::Opacity(self.vis.opacity));
        }
        Ok(())
    }
}

/// Dataset ids are slash-separated catalog paths: `USGS/SRTMGL1_003`.
fn is_valid_dataset(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '-'))
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
}
