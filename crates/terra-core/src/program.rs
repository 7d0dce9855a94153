//! The map program language.
//!
//! A map program is a short, line-oriented description of a map widget.
//! Each non-blank line is one statement; `#` starts a comment. Two
//! statement forms exist:
//!
//! ```text
//! map(center = [21.79, 70.87], zoom = 3, fullscreen_ctrl = off)
//! layer("USGS/SRTMGL1_003", min = 0, max = 6000, label = "SRTM")
//! ```
//!
//! `layer` also takes `palette = ["RRGGBB", ...]` and `opacity`.
//!
//! Every option is optional except the dataset id of a `layer`. Exactly one
//! `map(...)` statement is required and must come before any `layer(...)`.
//! Clients that can only submit single-line form values encode line breaks
//! as the two-character sequence `\n`; [`unescape_newlines`] restores them.

use crate::types::{LatLon, LayerSpec, MapSpec};
use thiserror::Error;

/// Replace literal `\n` two-character sequences with real newlines.
///
/// Applied to the `code` form field before parsing, so statement
/// separation survives urlencoded single-line submission.
pub fn unescape_newlines(code: &str) -> String {
    code.replace("\\n", "\n")
}

/// Why a map program was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgramError {
    #[error("line {line}: {message}")]
    Line { line: usize, message: String },

    #[error("program has no map(...) statement")]
    NoMap,
}

/// Parse a map program into a [`MapSpec`].
///
/// Parsing only checks form; range and catalog constraints are left to
/// [`MapSpec::validate`].
pub fn parse_program(source: &str) -> Result<MapSpec, ProgramError> {
    let mut spec: Option<MapSpec> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let at = |message: String| ProgramError::Line {
            line: line_no,
            message,
        };

        let tokens = tokenize(line).map_err(&at)?;
        match parse_statement(&tokens).map_err(&at)? {
            Statement::Map(args) => {
                if spec.is_some() {
                    return Err(at("more than one map(...) statement".to_string()));
                }
                spec = Some(build_map(args).map_err(&at)?);
            }
            Statement::Layer { dataset, args } => {
                let spec = spec
                    .as_mut()
                    .ok_or_else(|| at("layer(...) before map(...)".to_string()))?;
                spec.layers.push(build_layer(dataset, args).map_err(&at)?);
            }
        }
    }

    spec.ok_or(ProgramError::NoMap)
}

// ── Tokens ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eq,
}

fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => s.push(c),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        s.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(s));
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut s = String::new();
                if c == '-' {
                    s.push(c);
                    chars.next();
                }
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        s.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: f64 = s
                    .parse()
                    .map_err(|_| format!("malformed number {s:?}"))?;
                tokens.push(Token::Number(n));
            }
            c => return Err(format!("unexpected character {c:?}")),
        }
    }

    Ok(tokens)
}

// ── Statements ──────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Value {
    Num(f64),
    Str(String),
    Flag(bool),
    List(Vec<Value>),
}

#[derive(Debug, PartialEq)]
enum Statement {
    Map(Vec<(String, Value)>),
    Layer {
        dataset: String,
        args: Vec<(String, Value)>,
    },
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn expect(&mut self, want: &Token, what: &str) -> Result<(), String> {
        match self.next() {
            Some(t) if t == want => Ok(()),
            _ => Err(format!("expected {what}")),
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Value::Num(*n)),
            Some(Token::Str(s)) => Ok(Value::Str(s.clone())),
            Some(Token::Ident(s)) if s == "on" => Ok(Value::Flag(true)),
            Some(Token::Ident(s)) if s == "off" => Ok(Value::Flag(false)),
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                if self.peek() == Some(&Token::RBracket) {
                    self.next();
                    return Ok(Value::List(items));
                }
                loop {
                    items.push(self.value()?);
                    match self.next() {
                        Some(Token::Comma) => continue,
                        Some(Token::RBracket) => break,
                        _ => return Err("expected ',' or ']' in list".to_string()),
                    }
                }
                Ok(Value::List(items))
            }
            _ => Err("expected a value".to_string()),
        }
    }

    /// `key = value, key = value, ... )` — the closing paren is consumed.
    fn named_args(&mut self) -> Result<Vec<(String, Value)>, String> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.next();
            return Ok(args);
        }
        loop {
            let key = match self.next() {
                Some(Token::Ident(s)) => s.clone(),
                _ => return Err("expected an option name".to_string()),
            };
            self.expect(&Token::Eq, &format!("'=' after {key:?}"))?;
            let value = self.value()?;
            args.push((key, value));
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                _ => return Err("expected ',' or ')'".to_string()),
            }
        }
        Ok(args)
    }
}

fn parse_statement(tokens: &[Token]) -> Result<Statement, String> {
    let mut cursor = Cursor { tokens, pos: 0 };

    let head = match cursor.next() {
        Some(Token::Ident(s)) => s.clone(),
        _ => return Err("expected a statement".to_string()),
    };

    let statement = match head.as_str() {
        "map" => {
            cursor.expect(&Token::LParen, "'(' after map")?;
            Statement::Map(cursor.named_args()?)
        }
        "layer" => {
            cursor.expect(&Token::LParen, "'(' after layer")?;
            let dataset = match cursor.next() {
                Some(Token::Str(s)) => s.clone(),
                _ => return Err("layer takes a quoted dataset id first".to_string()),
            };
            let args = match cursor.next() {
                Some(Token::RParen) => Vec::new(),
                Some(Token::Comma) => cursor.named_args()?,
                _ => return Err("expected ',' or ')' after dataset id".to_string()),
            };
            Statement::Layer { dataset, args }
        }
        other => return Err(format!("unknown statement {other:?}")),
    };

    if cursor.peek().is_some() {
        return Err("unexpected trailing input".to_string());
    }
    Ok(statement)
}

// ── Building specs from statements ──────────────────────────────

fn build_map(args: Vec<(String, Value)>) -> Result<MapSpec, String> {
    let mut spec = MapSpec::default();
    for (key, value) in args {
        match (key.as_str(), value) {
            ("center", Value::List(items)) => {
                spec.center = match items.as_slice() {
                    [Value::Num(lat), Value::Num(lon)] => LatLon::new(*lat, *lon),
                    _ => return Err("center takes [lat, lon]".to_string()),
                };
            }
            ("zoom", Value::Num(n)) => {
                if n.fract() != 0.0 || !(0.0..=255.0).contains(&n) {
                    return Err("zoom must be a small non-negative integer".to_string());
                }
                spec.zoom = n as u8;
            }
            ("zoom_ctrl", Value::Flag(on)) => spec.controls.zoom = on,
            ("fullscreen_ctrl", Value::Flag(on)) => spec.controls.fullscreen = on,
            ("scale_ctrl", Value::Flag(on)) => spec.controls.scale = on,
            ("attribution_ctrl", Value::Flag(on)) => spec.controls.attribution = on,
            ("layer_ctrl", Value::Flag(on)) => spec.controls.layer_list = on,
            ("center", _) => return Err("center takes [lat, lon]".to_string()),
            ("zoom", _) => return Err("zoom takes a number".to_string()),
            (k @ ("zoom_ctrl" | "fullscreen_ctrl" | "scale_ctrl" | "attribution_ctrl"
            | "layer_ctrl"), _) => {
                return Err(format!("{k} takes on or off"));
            }
            (other, _) => return Err(format!("unknown map option {other:?}")),
        }
    }
    Ok(spec)
}

fn build_layer(dataset: String, args: Vec<(String, Value)>) -> Result<LayerSpec, String> {
    let mut layer = LayerSpec::new(dataset);
    for (key, value) in args {
        match (key.as_str(), value) {
            ("min", Value::Num(n)) => layer.vis.min = n,
            ("max", Value::Num(n)) => layer.vis.max = n,
            ("opacity", Value::Num(n)) => layer.vis.opacity = n,
            ("label", Value::Str(s)) => layer.label = s,
            ("palette", Value::List(items)) => {
                let mut palette = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Str(s) => palette.push(s),
                        _ => return Err("palette takes a list of color strings".to_string()),
                    }
                }
                layer.vis.palette = palette;
            }
            (k @ ("min" | "max" | "opacity"), _) => {
                return Err(format!("{k} takes a number"));
            }
            ("label", _) => return Err("label takes a string".to_string()),
            ("palette", _) => {
                return Err("palette takes a list of color strings".to_string());
            }
            (other, _) => return Err(format!("unknown layer option {other:?}")),
        }
    }
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Controls;

    const DEMO_PROGRAM: &str = r#"
# Elevation over the Indian subcontinent.
map(center = [21.79, 70.87], zoom = 3, fullscreen_ctrl = off)
layer("USGS/SRTMGL1_003", min = 0, max = 6000, palette = ["006633", "E5FFCC", "662A00", "D8D8D8", "F5F5F5"], label = "SRTM")
"#;

    #[test]
    fn parses_demo_program() {
        let spec = parse_program(DEMO_PROGRAM).unwrap();
        assert_eq!(spec.center, LatLon::new(21.79, 70.87));
        assert_eq!(spec.zoom, 3);
        assert!(!spec.controls.fullscreen);
        assert!(spec.controls.zoom);
        assert_eq!(spec.layers.len(), 1);

        let layer = &spec.layers[0];
        assert_eq!(layer.dataset, "USGS/SRTMGL1_003");
        assert_eq!(layer.label, "SRTM");
        assert_eq!(layer.vis.min, 0.0);
        assert_eq!(layer.vis.max, 6000.0);
        assert_eq!(layer.vis.palette.len(), 5);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn map_with_no_options_uses_defaults() {
        let spec = parse_program("map()").unwrap();
        assert_eq!(spec.center, LatLon::new(20.0, 0.0));
        assert_eq!(spec.zoom, 2);
        assert_eq!(spec.controls, Controls::default());
        assert!(spec.layers.is_empty());
    }

    #[test]
    fn layer_defaults() {
        let spec = parse_program("map()\nlayer(\"COPERNICUS/S2\")").unwrap();
        let layer = &spec.layers[0];
        assert_eq!(layer.label, "COPERNICUS/S2");
        assert_eq!(layer.vis.min, 0.0);
        assert_eq!(layer.vis.max, 1.0);
        assert_eq!(layer.vis.opacity, 1.0);
    }

    #[test]
    fn escaped_newlines_restore_statement_separation() {
        let submitted = r#"map(zoom = 4)\nlayer("USGS/SRTMGL1_003")"#;

        // As submitted, both statements sit on one line and parsing fails.
        assert!(matches!(
            parse_program(submitted),
            Err(ProgramError::Line { line: 1, .. })
        ));

        // Unescaping restores the line structure.
        let spec = parse_program(&unescape_newlines(submitted)).unwrap();
        assert_eq!(spec.zoom, 4);
        assert_eq!(spec.layers.len(), 1);
    }

    #[test]
    fn missing_map_statement() {
        assert_eq!(
            parse_program("layer(\"USGS/SRTMGL1_003\")"),
            Err(ProgramError::Line {
                line: 1,
                message: "layer(...) before map(...)".to_string()
            })
        );
        assert_eq!(parse_program(""), Err(ProgramError::NoMap));
        assert_eq!(parse_program("# just a comment\n\n"), Err(ProgramError::NoMap));
    }

    #[test]
    fn duplicate_map_statement() {
        let err = parse_program("map()\nmap()").unwrap_err();
        assert_eq!(
            err,
            ProgramError::Line {
                line: 2,
                message: "more than one map(...) statement".to_string()
            }
        );
    }

    #[test]
    fn unknown_statement() {
        assert!(matches!(
            parse_program("image(\"USGS/SRTMGL1_003\")"),
            Err(ProgramError::Line { line: 1, .. })
        ));
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(parse_program("map(tilt = 3)").is_err());
        assert!(parse_program("map()\nlayer(\"A/B\", gamma = 2)").is_err());
    }

    #[test]
    fn option_type_mismatches() {
        assert!(parse_program("map(zoom = \"three\")").is_err());
        assert!(parse_program("map(center = 21.79)").is_err());
        assert!(parse_program("map(center = [21.79])").is_err());
        assert!(parse_program("map(fullscreen_ctrl = 1)").is_err());
        assert!(parse_program("map()\nlayer(\"A/B\", palette = [1, 2])").is_err());
        assert!(parse_program("map()\nlayer(\"A/B\", min = \"low\")").is_err());
    }

    #[test]
    fn fractional_zoom_is_rejected() {
        assert!(parse_program("map(zoom = 2.5)").is_err());
    }

    #[test]
    fn layer_requires_quoted_dataset() {
        assert!(parse_program("map()\nlayer(USGS/SRTMGL1_003)").is_err());
        assert!(parse_program("map()\nlayer()").is_err());
    }

    #[test]
    fn unterminated_string() {
        assert!(matches!(
            parse_program("map()\nlayer(\"USGS"),
            Err(ProgramError::Line { line: 2, .. })
        ));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(parse_program("map() map()").is_err());
        assert!(parse_program("map())").is_err());
    }

    #[test]
    fn negative_coordinates_parse() {
        let spec = parse_program("map(center = [-33.87, -151.21], zoom = 10)").unwrap();
        assert_eq!(spec.center, LatLon::new(-33.87, -151.21));
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let spec = parse_program("\n  \n# comment\nmap(zoom = 5)\n\n").unwrap();
        assert_eq!(spec.zoom, 5);
    }

    #[test]
    fn error_reports_line_number() {
        let err = parse_program("map()\n\nlayer(\"A/B\", min = )").unwrap_err();
        assert!(matches!(err, ProgramError::Line { line: 3, .. }));
    }

    #[test]
    fn unescape_leaves_plain_text_alone() {
        assert_eq!(unescape_newlines("map()"), "map()");
        assert_eq!(unescape_newlines(r"a\nb"), "a\nb");
    }
}
