//! Named anchor positions and their fractional image coordinates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the nine overlay anchors (top/center/bottom × left/center/right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl Anchor {
    /// All anchors in row-major order.
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Fractional `(x, y)` of the overlay center, each in `[0, 1]`.
    pub fn to_fraction(self) -> (f64, f64) {
        match self {
            Anchor::TopLeft => (0.1, 0.1),
            Anchor::TopCenter => (0.5, 0.1),
            Anchor::TopRight => (0.9, 0.1),
            Anchor::CenterLeft => (0.1, 0.5),
            Anchor::Center => (0.5, 0.5),
            Anchor::CenterRight => (0.9, 0.5),
            Anchor::BottomLeft => (0.1, 0.9),
            Anchor::BottomCenter => (0.5, 0.9),
            Anchor::BottomRight => (0.9, 0.9),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopCenter => "top-center",
            Anchor::TopRight => "top-right",
            Anchor::CenterLeft => "center-left",
            Anchor::Center => "center",
            Anchor::CenterRight => "center-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomCenter => "bottom-center",
            Anchor::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown anchor '{s}'"))
    }
}
