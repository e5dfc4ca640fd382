use thiserror::Error;

/// Everything that can go wrong turning history text into spans.
///
/// All variants are fatal: the conversion aborts on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("line {line}: cannot parse `{text}`; expected `actor: op [key]`")]
    MalformedLine { line: usize, text: String },

    #[error("span `{key}` opened by actor `{actor}` on line {line} is never closed")]
    UnclosedSpan {
        actor: String,
        key: String,
        line: usize,
    },

    #[error("line {line}: key `{key}` is already open for actor `{owner}`, not `{actor}`")]
    DuplicateKey {
        line: usize,
        key: String,
        owner: String,
        actor: String,
    },

    #[error("line {line}: EVENT for actor `{actor}` has no open span{}", key_suffix(.key))]
    DanglingEvent {
        line: usize,
        actor: String,
        key: Option<String>,
    },

    #[error("line {line}: `{op}` cannot open a span")]
    ReservedOpener { line: usize, op: &'static str },

    #[error("line {line}: span `{key}` closes in the same step it was opened")]
    ZeroLengthSpan { line: usize, key: String },

    #[error("line {line}: {message}")]
    Grouping { line: usize, message: &'static str },
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(k) => format!(" with key `{}`", k),
        None => String::new(),
    }
}
