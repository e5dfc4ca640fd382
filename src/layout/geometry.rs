use crate::history::SpanId;
use crate::units::{Ch, Px};
use serde::Serialize;

/// Horizontal text anchor, as in SVG `text-anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Vertical text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// Text sits on `y`.
    Bottom,
    /// Text is centered on `y`.
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: Ch,
    pub y: Px,
    pub anchor: Anchor,
    pub baseline: Baseline,
}

impl Label {
    /// Leftmost horizontal extent of the text.
    pub fn left(&self) -> Ch {
        let w = Ch::of_text(&self.text);
        match self.anchor {
            Anchor::Start => self.x,
            Anchor::Middle => self.x - w / 2.0,
            Anchor::End => self.x - w,
        }
    }

    /// Rightmost horizontal extent of the text.
    pub fn right(&self) -> Ch {
        let w = Ch::of_text(&self.text);
        match self.anchor {
            Anchor::Start => self.x + w,
            Anchor::Middle => self.x + w / 2.0,
            Anchor::End => self.x,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Rect { x0: Ch, x1: Ch },
    Point { x: Ch },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanGeometry {
    pub id: SpanId,
    pub actor: String,
    /// Sub-row inside the actor's lane.
    pub row: usize,
    /// Centerline of the span.
    pub y: Px,
    pub shape: Shape,
    pub labels: Vec<Label>,
}

impl SpanGeometry {
    /// Move the shape and its labels right by `dx`.
    pub fn shift_x(&mut self, dx: Ch) {
        match &mut self.shape {
            Shape::Rect { x0, x1 } => {
                *x0 = *x0 + dx;
                *x1 = *x1 + dx;
            }
            Shape::Point { x } => *x = *x + dx,
        }
        for label in &mut self.labels {
            label.x = label.x + dx;
        }
    }

    /// Rightmost extent of the shape or any of its labels.
    pub fn right(&self) -> Ch {
        let shape_right = match self.shape {
            Shape::Rect { x1, .. } => x1,
            Shape::Point { x } => x,
        };
        self.labels.iter().map(Label::right).fold(shape_right, Ch::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneGeometry {
    pub actor: String,
    pub rows: usize,
    pub top: Px,
    pub height: Px,
    /// The lane's time axis runs along the first row.
    pub axis_y: Px,
    pub label: Label,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerGeometry {
    pub span: SpanId,
    pub x: Ch,
    pub y: Px,
}

/// Fully resolved diagram: the renderer only translates this into markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub width: Ch,
    pub height: Px,
    pub axis_start: Ch,
    pub axis_end: Ch,
    pub lanes: Vec<LaneGeometry>,
    pub spans: Vec<SpanGeometry>,
    pub markers: Vec<MarkerGeometry>,
}
