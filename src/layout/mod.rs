//! Layout: sequence index to x, actor to lane, spans to rectangles or points.
//!
//! Every step of the history gets one slot of fixed width; every actor gets
//! one lane, in order of first appearance. Spans of one actor that overlap in
//! time are stacked into sub-rows of that lane.

pub mod geometry;

pub use geometry::{Anchor, Baseline, Geometry, Label, LaneGeometry, MarkerGeometry, Shape, SpanGeometry};

use crate::history::{Closing, History, Span, SpanId};
use crate::units::{Ch, Px};
use std::collections::BTreeMap;
use thiserror::Error;

// Horizontal metrics.
const LEFT_MARGIN: Ch = Ch(1.0);
const ACTOR_GAP: Ch = Ch(4.0);
const SLOT_WIDTH: Ch = Ch(8.0);
const LABEL_INSET: Ch = Ch(1.0);
/// Minimum space between an opening and a closing label on one span.
const LABEL_SEPARATION: Ch = Ch(3.0);
const RIGHT_MARGIN: Ch = Ch(4.0);

// Vertical metrics.
const TOP_MARGIN: Px = Px(12.0);
const ROW_HEIGHT: Px = Px(36.0);
/// Offset of a span's centerline from the top of its row.
const ROW_CENTER: Px = Px(26.0);
pub const BAR_HALF_HEIGHT: Px = Px(6.0);
const LABEL_GAP: Px = Px(4.0);
const LANE_GAP: Px = Px(6.0);
const BOTTOM_MARGIN: Px = Px(6.0);

/// Parser and layout disagree; never expected for parser output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("span {span} ends at index {index}, beyond the {steps} steps of the history")]
    IndexOutOfBounds {
        span: usize,
        index: usize,
        steps: usize,
    },

    #[error("span {span} belongs to actor `{actor}`, which has no lane")]
    UnknownActor { span: usize, actor: String },

    #[error("marker at index {index} references unknown span {span}")]
    UnknownSpan { span: usize, index: usize },

    #[error("marker at index {index} lies outside span {span} [{start}, {end}]")]
    MarkerOutOfSpan {
        span: usize,
        index: usize,
        start: usize,
        end: usize,
    },
}

/// Width of the actor name column.
fn name_column(history: &History) -> Ch {
    history
        .actors
        .iter()
        .map(|a| Ch::of_text(a))
        .fold(Ch(0.0), Ch::max)
}

/// Center of the slot for sequence index `index`.
fn slot_x(origin: Ch, index: usize) -> Ch {
    origin + SLOT_WIDTH * (index as f64 + 0.5)
}

/// Horizontal extent of a keyed span. A span closed with its own label is
/// widened past its closing slot until both labels fit side by side.
fn rect_width(span: &Span) -> Ch {
    let slots = SLOT_WIDTH * span.end.saturating_sub(span.start) as f64;
    match &span.closing {
        Closing::Label(close) if close != &span.label => {
            let labels = Ch::of_text(&span.label)
                + Ch::of_text(close)
                + LABEL_INSET * 2.0
                + LABEL_SEPARATION;
            slots.max(labels)
        }
        _ => slots,
    }
}

/// Last sequence index a span covers in its row, widening included.
fn occupied_until(span: &Span) -> usize {
    let slots = (rect_width(span).0 / SLOT_WIDTH.0).ceil() as usize;
    span.end.max(span.start + slots)
}

/// Assign each span the lowest sub-row of its actor's lane that is free at
/// its start. Spans are visited in opening order.
fn assign_rows(spans: &[Span]) -> (BTreeMap<SpanId, usize>, BTreeMap<&str, usize>) {
    let mut row_ends: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut rows = BTreeMap::new();

    for span in spans {
        let ends = row_ends.entry(span.actor.as_str()).or_default();
        let row = match ends.iter().position(|&end| end < span.start) {
            Some(r) => {
                ends[r] = occupied_until(span);
                r
            }
            None => {
                ends.push(occupied_until(span));
                ends.len() - 1
            }
        };
        rows.insert(span.id, row);
    }

    let counts = row_ends
        .into_iter()
        .map(|(actor, ends)| (actor, ends.len()))
        .collect();
    (rows, counts)
}

fn span_labels(span: &Span, shape: &Shape, y: Px) -> Vec<Label> {
    let text_y = y - BAR_HALF_HEIGHT - LABEL_GAP;
    let label = |text: &str, x: Ch, anchor: Anchor| Label {
        text: text.to_string(),
        x,
        y: text_y,
        anchor,
        baseline: Baseline::Bottom,
    };

    match (shape, &span.closing) {
        (Shape::Point { x }, _) => vec![label(&span.label, *x, Anchor::Middle)],
        (Shape::Rect { x0, x1 }, Closing::End | Closing::Point) => {
            vec![label(&span.label, (*x0 + *x1) / 2.0, Anchor::Middle)]
        }
        (Shape::Rect { x0, x1 }, Closing::Label(close)) => {
            let mut out = vec![label(&span.label, *x0 + LABEL_INSET, Anchor::Start)];
            if close != &span.label {
                out.push(label(close, *x1 - LABEL_INSET, Anchor::End));
            }
            out
        }
    }
}

/// Resolve a parsed history into absolute geometry.
///
/// Pure and deterministic: the same history always yields identical output.
pub fn layout(history: &History) -> Result<Geometry, LayoutError> {
    let name_x = LEFT_MARGIN + name_column(history);
    let mut origin = name_x + ACTOR_GAP;
    let mut axis_end = origin + SLOT_WIDTH * history.steps as f64;
    let (rows, row_counts) = assign_rows(&history.spans);

    // Lanes, top to bottom.
    let mut lanes = Vec::with_capacity(history.actors.len());
    let mut lane_top: BTreeMap<&str, Px> = BTreeMap::new();
    let mut top = TOP_MARGIN;
    for actor in &history.actors {
        let n = row_counts.get(actor.as_str()).copied().unwrap_or(1).max(1);
        let height = ROW_HEIGHT * n as f64;
        lanes.push(LaneGeometry {
            actor: actor.clone(),
            rows: n,
            top,
            height,
            axis_y: top + ROW_CENTER,
            label: Label {
                text: actor.clone(),
                x: name_x,
                y: top + height / 2.0,
                anchor: Anchor::End,
                baseline: Baseline::Middle,
            },
        });
        lane_top.insert(actor.as_str(), top);
        top = top + height + LANE_GAP;
    }
    let height = top - LANE_GAP + BOTTOM_MARGIN;

    // Spans.
    let mut spans = Vec::with_capacity(history.spans.len());
    let mut span_y: BTreeMap<SpanId, Px> = BTreeMap::new();
    for span in &history.spans {
        if span.end >= history.steps || span.start > span.end {
            return Err(LayoutError::IndexOutOfBounds {
                span: span.id.0,
                index: span.end,
                steps: history.steps,
            });
        }
        let Some(&lane) = lane_top.get(span.actor.as_str()) else {
            return Err(LayoutError::UnknownActor {
                span: span.id.0,
                actor: span.actor.clone(),
            });
        };
        let row = rows.get(&span.id).copied().unwrap_or(0);
        let y = lane + ROW_HEIGHT * row as f64 + ROW_CENTER;
        let shape = if span.is_point() {
            Shape::Point {
                x: slot_x(origin, span.start),
            }
        } else {
            let x0 = slot_x(origin, span.start);
            Shape::Rect {
                x0,
                x1: x0 + rect_width(span),
            }
        };
        let labels = span_labels(span, &shape, y);
        span_y.insert(span.id, y);
        spans.push(SpanGeometry {
            id: span.id,
            actor: span.actor.clone(),
            row,
            y,
            shape,
            labels,
        });
    }

    // Markers.
    let mut markers = Vec::with_capacity(history.markers.len());
    for marker in &history.markers {
        let (Some(owner), Some(&y)) = (history.span(marker.span), span_y.get(&marker.span)) else {
            return Err(LayoutError::UnknownSpan {
                span: marker.span.0,
                index: marker.index,
            });
        };
        if marker.index < owner.start || marker.index > owner.end {
            return Err(LayoutError::MarkerOutOfSpan {
                span: owner.id.0,
                index: marker.index,
                start: owner.start,
                end: owner.end,
            });
        }
        markers.push(MarkerGeometry {
            span: marker.span,
            x: slot_x(origin, marker.index),
            y,
        });
    }

    // Labels centered on early slots can hang into the name column.
    let floor = name_x + LABEL_INSET;
    let leftmost = spans
        .iter()
        .flat_map(|s| s.labels.iter().map(Label::left))
        .fold(floor, Ch::min);
    let shift = floor - leftmost;
    if shift > Ch(0.0) {
        origin = origin + shift;
        axis_end = axis_end + shift;
        for span in &mut spans {
            span.shift_x(shift);
        }
        for marker in &mut markers {
            marker.x = marker.x + shift;
        }
    }

    let width = spans.iter().map(SpanGeometry::right).fold(axis_end, Ch::max) + RIGHT_MARGIN;

    Ok(Geometry {
        width,
        height,
        axis_start: origin,
        axis_end,
        lanes,
        spans,
        markers,
    })
}
