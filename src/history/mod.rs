//! Operation history: tokenizing the text DSL and matching spans by key.

pub mod error;
pub mod line;
pub mod parse;
pub mod span;
pub mod tokenize;

pub use error::HistoryError;
pub use parse::parse_history;
pub use span::{Closing, History, Marker, Span, SpanId};
pub use tokenize::Tokenizer;
