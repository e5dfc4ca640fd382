use serde::Serialize;

/// Identity of a span: its position in opening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SpanId(pub usize);

/// How a span was closed, which decides its label placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Closing {
    /// Unkeyed line: opened and closed in one step.
    Point,
    /// Closed by `END`; the opening label covers the whole span.
    End,
    /// Closed by a line with its own text, shown at the close edge.
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub id: SpanId,
    pub actor: String,
    pub key: Option<String>,
    /// Text of the opening operation.
    pub label: String,
    pub closing: Closing,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn is_point(&self) -> bool {
        matches!(self.closing, Closing::Point)
    }
}

/// An `EVENT` dot inside an open span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub actor: String,
    pub index: usize,
    pub span: SpanId,
}

/// Parser output: everything layout needs, in deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct History {
    /// Actors in order of first appearance.
    pub actors: Vec<String>,
    /// Closed spans, ordered by `SpanId` (opening order).
    pub spans: Vec<Span>,
    pub markers: Vec<Marker>,
    /// Number of sequence slots consumed by the input.
    pub steps: usize,
}

impl History {
    pub fn span(&self, id: SpanId) -> Option<&Span> {
        self.spans
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.spans[i])
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
