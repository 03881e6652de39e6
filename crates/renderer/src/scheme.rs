//! Color schemes for heatmap colorization.
//!
//! A scheme is defined by ordered gradient stops over normalized intensity
//! `[0, 1]` and baked into a 256-entry RGBA lookup table. Schemes are
//! immutable once built and are shared read-only between renders.
//!
//! Custom schemes load from JSON:
//!
//! ```json
//! {
//!   "name": "ocean",
//!   "stops": [
//!     { "value": 0.0, "color": "#00206000" },
//!     { "value": 1.0, "color": [0, 255, 255, 230] }
//!   ]
//! }
//! ```

use std::path::Path;

use heatmap_common::{HeatmapError, HeatmapResult};
use serde::{Deserialize, Serialize};

/// Number of entries in a baked lookup table.
pub const TABLE_SIZE: usize = 256;

/// Names of the schemes compiled into the binary.
pub const BUILTIN_SCHEMES: &[&str] = &["classic", "fire", "pbj"];

/// Color in a scheme definition: `"#RRGGBB"`, `"#RRGGBBAA"` or `[r, g, b(, a)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Hex(String),
    Array(Vec<u8>),
}

impl Color {
    /// Convert to an RGBA quadruple, rejecting malformed values.
    pub fn to_rgba(&self) -> HeatmapResult<[u8; 4]> {
        match self {
            Color::Hex(s) => parse_hex_color(s),
            Color::Array(arr) => match arr.as_slice() {
                [r, g, b] => Ok([*r, *g, *b, 255]),
                [r, g, b, a] => Ok([*r, *g, *b, *a]),
                _ => Err(HeatmapError::InvalidColorScheme(format!(
                    "color array must have 3 or 4 components, got {}",
                    arr.len()
                ))),
            },
        }
    }
}

fn parse_hex_color(s: &str) -> HeatmapResult<[u8; 4]> {
    let hex = s.trim_start_matches('#');
    let invalid = || HeatmapError::InvalidColorScheme(format!("invalid hex color '{}'", s));

    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };

    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// A color stop in a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Normalized intensity at this stop, in `[0, 1]`
    pub value: f64,

    /// The color at this stop
    pub color: Color,
}

/// Serializable scheme definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeDefinition {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub stops: Vec<ColorStop>,
}

impl SchemeDefinition {
    pub fn validate(&self) -> HeatmapResult<()> {
        if self.stops.len() < 2 {
            return Err(HeatmapError::InvalidColorScheme(format!(
                "{}: gradient must have at least 2 color stops",
                self.name
            )));
        }

        for stop in &self.stops {
            if !(0.0..=1.0).contains(&stop.value) {
                return Err(HeatmapError::InvalidColorScheme(format!(
                    "{}: stop value {} outside [0, 1]",
                    self.name, stop.value
                )));
            }
        }

        for pair in self.stops.windows(2) {
            if pair[1].value <= pair[0].value {
                return Err(HeatmapError::InvalidColorScheme(format!(
                    "{}: color stops must be in ascending value order",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

/// Baked intensity → RGBA lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    name: String,
    table: Vec<[u8; 4]>,
}

impl ColorScheme {
    /// Bake a scheme from `(value, rgba)` stops.
    pub fn from_stops(name: &str, stops: &[(f64, [u8; 4])]) -> HeatmapResult<Self> {
        let definition = SchemeDefinition {
            name: name.to_string(),
            description: String::new(),
            stops: stops
                .iter()
                .map(|(value, c)| ColorStop {
                    value: *value,
                    color: Color::Array(c.to_vec()),
                })
                .collect(),
        };
        Self::from_definition(&definition)
    }

    pub fn from_definition(definition: &SchemeDefinition) -> HeatmapResult<Self> {
        definition.validate()?;

        let stops = definition
            .stops
            .iter()
            .map(|s| Ok((s.value, s.color.to_rgba()?)))
            .collect::<HeatmapResult<Vec<(f64, [u8; 4])>>>()?;

        let table = (0..TABLE_SIZE)
            .map(|i| interpolate(&stops, i as f64 / (TABLE_SIZE - 1) as f64))
            .collect();

        Ok(Self {
            name: definition.name.clone(),
            table,
        })
    }

    /// Parse a scheme definition from a JSON string.
    pub fn from_json(json: &str) -> HeatmapResult<Self> {
        let definition: SchemeDefinition = serde_json::from_str(json)
            .map_err(|e| HeatmapError::InvalidColorScheme(e.to_string()))?;
        Self::from_definition(&definition)
    }

    /// Load a scheme definition from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeatmapError::InvalidColorScheme(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Look up a built-in scheme by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "fire" => Some(Self::fire()),
            "pbj" => Some(Self::pbj()),
            _ => None,
        }
    }

    /// Resolve a configuration value: a built-in name, else a JSON file path.
    pub fn from_name_or_path(value: &str) -> HeatmapResult<Self> {
        if let Some(scheme) = Self::builtin(value) {
            return Ok(scheme);
        }
        if Path::new(value).is_file() {
            return Self::from_file(value);
        }
        Err(HeatmapError::InvalidColorScheme(format!(
            "unknown color scheme '{}' (built-in: {})",
            value,
            BUILTIN_SCHEMES.join(", ")
        )))
    }

    /// Transparent blue through cyan, green and yellow to red.
    pub fn classic() -> Self {
        Self::bake(
            "classic",
            &[
                (0.0, [0, 0, 255, 0]),
                (0.25, [0, 255, 255, 128]),
                (0.5, [0, 255, 0, 170]),
                (0.75, [255, 255, 0, 210]),
                (1.0, [255, 0, 0, 240]),
            ],
        )
    }

    /// Dark red through orange to pale yellow.
    pub fn fire() -> Self {
        Self::bake(
            "fire",
            &[
                (0.0, [128, 0, 0, 0]),
                (0.2, [128, 0, 0, 96]),
                (0.45, [255, 64, 0, 160]),
                (0.7, [255, 200, 0, 210]),
                (1.0, [255, 255, 224, 240]),
            ],
        )
    }

    /// Purple and blue shading into peanut-butter yellow.
    pub fn pbj() -> Self {
        Self::bake(
            "pbj",
            &[
                (0.0, [64, 0, 96, 0]),
                (0.3, [96, 32, 200, 120]),
                (0.6, [200, 80, 120, 180]),
                (1.0, [255, 210, 90, 230]),
            ],
        )
    }

    fn bake(name: &str, stops: &[(f64, [u8; 4])]) -> Self {
        let table = (0..TABLE_SIZE)
            .map(|i| interpolate(stops, i as f64 / (TABLE_SIZE - 1) as f64))
            .collect();
        Self {
            name: name.to_string(),
            table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &[[u8; 4]] {
        &self.table
    }

    /// Color for a normalized intensity; values are clamped to `[0, 1]`.
    #[inline]
    pub fn color_for(&self, normalized: f64) -> [u8; 4] {
        let idx = (normalized.clamp(0.0, 1.0) * (TABLE_SIZE - 1) as f64).round() as usize;
        self.table[idx]
    }
}

/// `pbj` is the default scheme for served tiles.
impl Default for ColorScheme {
    fn default() -> Self {
        Self::pbj()
    }
}

/// Linear RGBA interpolation between the stops bracketing `value`.
///
/// Stops must be ascending; values outside the stop range take the nearest
/// end color.
fn interpolate(stops: &[(f64, [u8; 4])], value: f64) -> [u8; 4] {
    let (first_value, first_color) = stops[0];
    let (last_value, last_color) = stops[stops.len() - 1];

    if value <= first_value {
        return first_color;
    }
    if value >= last_value {
        return last_color;
    }

    for pair in stops.windows(2) {
        let (lo_value, lo) = pair[0];
        let (hi_value, hi) = pair[1];
        if value <= hi_value {
            let t = (value - lo_value) / (hi_value - lo_value);
            let lerp = |a: u8, b: u8| ((a as f64) * (1.0 - t) + (b as f64) * t).round() as u8;
            return [
                lerp(lo[0], hi[0]),
                lerp(lo[1], hi[1]),
                lerp(lo[2], hi[2]),
                lerp(lo[3], hi[3]),
            ];
        }
    }

    last_color
}
