//! Typed lengths.
//!
//! Horizontal positions are measured in `ch` (character widths) so that text
//! and geometry scale together; vertical positions are always `px`.

use serde::Serialize;
use std::ops::{Add, Div, Mul, Sub};

/// Width of one `ch` when rendering in embed mode.
pub const CH_WIDTH_IN_PX: f64 = 7.0;
/// Fixed font size used in embed mode.
pub const EMBED_FONT_PX: f64 = 12.0;

macro_rules! length {
    ($name:ident, $suffix:literal) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", self.0, $suffix)
            }
        }
    };
}

length!(Ch, "ch");
length!(Px, "px");

impl Ch {
    pub fn max(self, other: Self) -> Self {
        Ch(self.0.max(other.0))
    }

    pub fn min(self, other: Self) -> Self {
        Ch(self.0.min(other.0))
    }

    /// Width of `text` in a monospace font.
    pub fn of_text(text: &str) -> Self {
        Ch(text.chars().count() as f64)
    }

    pub fn to_px(self) -> Px {
        Px(self.0 * CH_WIDTH_IN_PX)
    }
}

/// How lengths are written into the SVG.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    /// Horizontal lengths in `ch`, so the diagram follows the viewer's font.
    #[default]
    Scalable,
    /// Everything in `px` with a fixed font size, for viewers without CSS
    /// font contexts.
    Embed,
}

impl UnitMode {
    pub fn x(self, v: Ch) -> String {
        match self {
            UnitMode::Scalable => v.to_string(),
            UnitMode::Embed => v.to_px().to_string(),
        }
    }

    pub fn y(self, v: Px) -> String {
        v.to_string()
    }
}
