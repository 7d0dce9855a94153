//! View types for widget template rendering.
//!
//! These types are purpose-built for the Askama template: they carry
//! pre-formatted strings, with all JS-context escaping done here in Rust,
//! so the template only places values.

use terra_core::{LayerSpec, MapSpec};

/// One tile layer, ready for the `<script>` block.
pub struct LayerView {
    /// Quoted, escaped JS string literal.
    pub tile_url_js: String,
    /// Quoted, escaped JS string literal used as the overlay key.
    pub label_js: String,
    /// Quoted, escaped JS string literal; carries the dataset id.
    pub attribution_js: String,
    pub opacity: String,
}

impl LayerView {
    pub fn new(layer: &LayerSpec, tile_url: &str) -> Self {
        Self {
            tile_url_js: js_string(tile_url),
            label_js: js_string(&layer.label),
            attribution_js: js_string(&layer.dataset),
            opacity: fmt_num(layer.vis.opacity),
        }
    }
}

/// One legend row: label, color ramp, value range.
pub struct LegendView {
    pub dataset: String,
    pub label: String,
    /// Comma-separated `#RRGGBB` stops for a CSS linear-gradient.
    pub gradient: String,
    pub min: String,
    pub max: String,
}

impl LegendView {
    pub fn new(layer: &LayerSpec) -> Self {
        let gradient = layer
            .vis
            .palette
            .iter()
            .map(|c| format!("#{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            dataset: layer.dataset.clone(),
            label: layer.label.clone(),
            gradient,
            min: fmt_num(layer.vis.min),
            max: fmt_num(layer.vis.max),
        }
    }
}

/// Format the map center as a `lat, lon` pair for `L.map` options.
pub fn center_js(spec: &MapSpec) -> String {
    format!("{}, {}", fmt_num(spec.center.lat), fmt_num(spec.center.lon))
}

/// `f64` in its shortest round-trip form; valid in both JS and legend text.
pub fn fmt_num(n: f64) -> String {
    format!("{n}")
}

/// Quote and escape a string for direct placement inside `<script>`.
///
/// Escapes the HTML-sensitive characters too, so the literal can never
/// terminate the surrounding script element.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_core::LatLon;

    #[test]
    fn js_string_escapes_quotes_and_tags() {
        assert_eq!(js_string("plain"), r#""plain""#);
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
        assert_eq!(js_string(r"a\b"), r#""a\\b""#);
        assert_eq!(
            js_string("</script>"),
            "\"\\u003C/script\\u003E\""
        );
    }

    #[test]
    fn numbers_render_without_trailing_zeroes() {
        assert_eq!(fmt_num(0.0), "0");
        assert_eq!(fmt_num(6000.0), "6000");
        assert_eq!(fmt_num(21.79), "21.79");
        assert_eq!(fmt_num(-151.21), "-151.21");
    }

    #[test]
    fn center_is_a_pair() {
        let spec = MapSpec {
            center: LatLon::new(21.79, 70.87),
            ..MapSpec::default()
        };
        assert_eq!(center_js(&spec), "21.79, 70.87");
    }

    #[test]
    fn legend_gradient_prefixes_hash() {
        let mut layer = LayerSpec::new("USGS/SRTMGL1_003");
        layer.vis.palette = vec!["006633".to_string(), "F5F5F5".to_string()];
        let view = LegendView::new(&layer);
        assert_eq!(view.gradient, "#006633, #F5F5F5");
    }

    #[test]
    fn layer_view_carries_dataset_in_attribution() {
        let layer = LayerSpec::new("USGS/SRTMGL1_003");
        let view = LayerView::new(&layer, "https://eo.example.com/t/{z}/{x}/{y}");
        assert_eq!(view.attribution_js, r#""USGS/SRTMGL1_003""#);
        assert!(view.tile_url_js.contains("{z}/{x}/{y}"));
    }
}
