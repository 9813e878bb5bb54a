//! Logo overlay parameters.
//!
//! A [`LogoSettings`] record is fully specified at creation time; every
//! field has its default applied once and every update is clamped to the
//! documented range, so render code never re-derives defaults.

use serde::{Deserialize, Serialize};

use crate::position::Anchor;
use crate::source::PixelSource;

pub const DEFAULT_SIZE: f64 = 10.0;
pub const DEFAULT_OPACITY: f64 = 0.8;
pub const DEFAULT_PATTERN_SIZE: f64 = 100.0;

const SIZE_RANGE: (f64, f64) = (1.0, 100.0);
const PATTERN_SIZE_RANGE: (f64, f64) = (10.0, 200.0);
const OFFSET_RANGE: (f64, f64) = (-100.0, 100.0);
const SPACING_RANGE: (f64, f64) = (0.0, 200.0);

/// Placement and appearance parameters of one logo.
///
/// Not `Deserialize`: external input arrives as a
/// [`LogoUpdate`] and goes through the clamping setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoSettings {
    anchor: Anchor,
    /// Width as a percentage of the base image width (single-overlay mode).
    size: f64,
    opacity: f64,
    /// Tile scale relative to the base tile size, in percent.
    pattern_size: f64,
    /// Degrees in `[0, 360)`.
    pattern_rotation: f64,
    pattern_offset_x: f64,
    pattern_offset_y: f64,
    pattern_spacing_x: f64,
    pattern_spacing_y: f64,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            anchor: Anchor::BottomRight,
            size: DEFAULT_SIZE,
            opacity: DEFAULT_OPACITY,
            pattern_size: DEFAULT_PATTERN_SIZE,
            pattern_rotation: 0.0,
            pattern_offset_x: 0.0,
            pattern_offset_y: 0.0,
            pattern_spacing_x: 0.0,
            pattern_spacing_y: 0.0,
        }
    }
}

impl LogoSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Fractional overlay center, always in sync with the anchor.
    pub fn center(&self) -> (f64, f64) {
        self.anchor.to_fraction()
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn pattern_size(&self) -> f64 {
        self.pattern_size
    }

    pub fn pattern_rotation(&self) -> f64 {
        self.pattern_rotation
    }

    pub fn pattern_offset(&self) -> (f64, f64) {
        (self.pattern_offset_x, self.pattern_offset_y)
    }

    pub fn pattern_spacing(&self) -> (f64, f64) {
        (self.pattern_spacing_x, self.pattern_spacing_y)
    }

    /// Builder: set anchor.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Builder: set size percentage (clamped to 1..=100).
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = clamp(size, SIZE_RANGE, self.size);
        self
    }

    /// Builder: set opacity (clamped to 0..=1).
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp(opacity, (0.0, 1.0), self.opacity);
        self
    }

    /// Builder: set pattern size percentage (clamped to 10..=200).
    pub fn with_pattern_size(mut self, pattern_size: f64) -> Self {
        self.pattern_size = clamp(pattern_size, PATTERN_SIZE_RANGE, self.pattern_size);
        self
    }

    /// Builder: set pattern rotation, normalized into `[0, 360)`.
    pub fn with_pattern_rotation(mut self, degrees: f64) -> Self {
        if degrees.is_finite() {
            self.pattern_rotation = normalize_degrees(degrees);
        }
        self
    }

    /// Builder: set pattern offset in pixels (each clamped to -100..=100).
    pub fn with_pattern_offset(mut self, x: f64, y: f64) -> Self {
        self.pattern_offset_x = clamp(x, OFFSET_RANGE, self.pattern_offset_x);
        self.pattern_offset_y = clamp(y, OFFSET_RANGE, self.pattern_offset_y);
        self
    }

    /// Builder: set pattern spacing percentages (each clamped to 0..=200).
    pub fn with_pattern_spacing(mut self, x: f64, y: f64) -> Self {
        self.pattern_spacing_x = clamp(x, SPACING_RANGE, self.pattern_spacing_x);
        self.pattern_spacing_y = clamp(y, SPACING_RANGE, self.pattern_spacing_y);
        self
    }

    /// Apply a partial update; absent fields keep their current value.
    pub fn apply(&mut self, update: &LogoUpdate) {
        let mut next = self.clone();
        if let Some(anchor) = update.anchor {
            next = next.with_anchor(anchor);
        }
        if let Some(size) = update.size {
            next = next.with_size(size);
        }
        if let Some(opacity) = update.opacity {
            next = next.with_opacity(opacity);
        }
        if let Some(pattern_size) = update.pattern_size {
            next = next.with_pattern_size(pattern_size);
        }
        if let Some(rotation) = update.pattern_rotation {
            next = next.with_pattern_rotation(rotation);
        }
        let (ox, oy) = next.pattern_offset();
        next = next.with_pattern_offset(
            update.pattern_offset_x.unwrap_or(ox),
            update.pattern_offset_y.unwrap_or(oy),
        );
        let (sx, sy) = next.pattern_spacing();
        next = next.with_pattern_spacing(
            update.pattern_spacing_x.unwrap_or(sx),
            update.pattern_spacing_y.unwrap_or(sy),
        );
        *self = next;
    }

    /// Overwrite rotation, size and offset with a named preset.
    pub fn apply_preset(&mut self, preset: PatternPreset) {
        let p = preset.params();
        *self = self
            .clone()
            .with_pattern_rotation(p.rotation)
            .with_pattern_size(p.size)
            .with_pattern_offset(p.offset_x, p.offset_y);
    }
}

/// Partial parameter update, as sent by an editing surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoUpdate {
    pub anchor: Option<Anchor>,
    pub size: Option<f64>,
    pub opacity: Option<f64>,
    pub pattern_size: Option<f64>,
    pub pattern_rotation: Option<f64>,
    pub pattern_offset_x: Option<f64>,
    pub pattern_offset_y: Option<f64>,
    pub pattern_spacing_x: Option<f64>,
    pub pattern_spacing_y: Option<f64>,
}

/// Named pattern parameter presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternPreset {
    Diagonal,
    Grid,
    Scattered,
    Dense,
}

/// Parameters a [`PatternPreset`] writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetParams {
    pub rotation: f64,
    pub size: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl PatternPreset {
    pub fn params(self) -> PresetParams {
        let (rotation, size, offset_x, offset_y) = match self {
            PatternPreset::Diagonal => (45.0, 50.0, 20.0, 20.0),
            PatternPreset::Grid => (0.0, 80.0, 0.0, 0.0),
            PatternPreset::Scattered => (15.0, 30.0, 10.0, 10.0),
            PatternPreset::Dense => (0.0, 40.0, 5.0, 5.0),
        };
        PresetParams {
            rotation,
            size,
            offset_x,
            offset_y,
        }
    }
}

/// A watermark source plus its parameters. Identity is stable across
/// reorders and source replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub id: String,
    pub source: PixelSource,
    pub settings: LogoSettings,
}

impl Logo {
    pub fn new(id: impl Into<String>, source: PixelSource) -> Self {
        Self {
            id: id.into(),
            source,
            settings: LogoSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: LogoSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Clamp to `range`; non-finite input keeps `fallback`.
fn clamp(value: f64, range: (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(range.0, range.1)
    } else {
        fallback
    }
}

fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative input
    if d >= 360.0 { 0.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new_logo_contract() {
        let s = LogoSettings::default();
        assert_eq!(s.anchor(), Anchor::BottomRight);
        assert_eq!(s.center(), (0.9, 0.9));
        assert_eq!(s.size(), 10.0);
        assert_eq!(s.opacity(), 0.8);
        assert_eq!(s.pattern_size(), 100.0);
        assert_eq!(s.pattern_spacing(), (0.0, 0.0));
        assert_eq!(s.pattern_offset(), (0.0, 0.0));
        assert_eq!(s.pattern_rotation(), 0.0);
    }

    #[test]
    fn builders_clamp_to_ranges() {
        let s = LogoSettings::new()
            .with_size(0.0)
            .with_opacity(1.5)
            .with_pattern_size(500.0)
            .with_pattern_offset(-250.0, 42.0)
            .with_pattern_spacing(-1.0, 300.0);
        assert_eq!(s.size(), 1.0);
        assert_eq!(s.opacity(), 1.0);
        assert_eq!(s.pattern_size(), 200.0);
        assert_eq!(s.pattern_offset(), (-100.0, 42.0));
        assert_eq!(s.pattern_spacing(), (0.0, 200.0));
    }

    #[test]
    fn rotation_normalizes_into_half_open_range() {
        assert_eq!(LogoSettings::new().with_pattern_rotation(360.0).pattern_rotation(), 0.0);
        assert_eq!(LogoSettings::new().with_pattern_rotation(-90.0).pattern_rotation(), 270.0);
        assert_eq!(LogoSettings::new().with_pattern_rotation(725.0).pattern_rotation(), 5.0);
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let s = LogoSettings::new().with_opacity(f64::NAN).with_size(f64::INFINITY);
        assert_eq!(s.opacity(), DEFAULT_OPACITY);
        assert_eq!(s.size(), DEFAULT_SIZE);
    }

    #[test]
    fn anchor_change_moves_center() {
        let mut s = LogoSettings::new();
        s.apply(&LogoUpdate {
            anchor: Some(Anchor::TopLeft),
            ..Default::default()
        });
        assert_eq!(s.center(), (0.1, 0.1));
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let mut s = LogoSettings::new().with_pattern_offset(10.0, -20.0);
        s.apply(&LogoUpdate {
            pattern_offset_x: Some(55.0),
            opacity: Some(0.25),
            ..Default::default()
        });
        assert_eq!(s.pattern_offset(), (55.0, -20.0));
        assert_eq!(s.opacity(), 0.25);
        assert_eq!(s.size(), DEFAULT_SIZE);
    }

    #[test]
    fn preset_overwrites_pattern_fields_only() {
        let mut s = LogoSettings::new().with_opacity(0.3).with_pattern_spacing(50.0, 50.0);
        s.apply_preset(PatternPreset::Diagonal);
        assert_eq!(s.pattern_rotation(), 45.0);
        assert_eq!(s.pattern_size(), 50.0);
        assert_eq!(s.pattern_offset(), (20.0, 20.0));
        assert_eq!(s.opacity(), 0.3);
        assert_eq!(s.pattern_spacing(), (50.0, 50.0));
    }

    #[test]
    fn update_deserializes_from_camel_case_json() {
        let update: LogoUpdate =
            serde_json::from_str(r#"{"anchor":"center","patternSpacingX":40}"#).unwrap();
        assert_eq!(update.anchor, Some(Anchor::Center));
        assert_eq!(update.pattern_spacing_x, Some(40.0));
        assert_eq!(update.size, None);
    }
}
