//! SVG rendering of laid-out histories.

pub mod svg;

pub use svg::render_svg;

use crate::units::UnitMode;
use serde::Serialize;

/// The only knobs the renderer honors. Layout never sees these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderConfig {
    pub mode: UnitMode,
    /// Draw dashed lines at lane edges to debug alignment.
    pub guidelines: bool,
}
