//! Tokenizer for the operation history DSL.
//!
//! Grammar, one record per line:
//!
//! ```text
//! TEXT      := "[^"]+" | [A-Za-z0-9_(){}\[\],.]+
//! SEPARATOR := NOTHING | : | .
//! LINE      := NOTHING | COMMENT | ACTOR SEPARATOR? TEXT TEXT? COMMENT?
//! COMMENT   := #.*
//! ```
//!
//! Actors may not contain `.` so that `a.write k` splits as actor `a`,
//! operation `write`. Without a separator, actor and operation must be
//! divided by whitespace.

use crate::history::error::HistoryError;
use crate::history::line::{Line, Operation, unquote};
use regex::Regex;

const ACTOR: &str = r#""[^"]+"|[A-Za-z0-9_(){}\[\],]+"#;
const TEXT: &str = r#""[^"]+"|[A-Za-z0-9_(){}\[\],.]+"#;

pub struct Tokenizer {
    line_re: Regex,
}

impl Tokenizer {
    pub fn new() -> Result<Self, regex::Error> {
        let pattern = format!(
            r#"^\s*(?P<actor>{ACTOR})(?:\s*[:.]\s*|\s+)(?P<op>{TEXT})(?:\s+(?P<key>{TEXT}))?\s*(?:#.*)?$"#
        );
        Ok(Self {
            line_re: Regex::new(&pattern)?,
        })
    }

    /// Split one non-blank, non-comment line into a `Line` record.
    pub fn tokenize_line(&self, number: usize, seq: usize, text: &str) -> Result<Line, HistoryError> {
        let malformed = || HistoryError::MalformedLine {
            line: number,
            text: text.to_string(),
        };

        let caps = self.line_re.captures(text).ok_or_else(malformed)?;
        let actor = caps.name("actor").ok_or_else(malformed)?.as_str();
        let op = caps.name("op").ok_or_else(malformed)?.as_str();
        let key = caps.name("key").map(|k| unquote(k.as_str()).to_string());

        Ok(Line {
            number,
            seq,
            actor: unquote(actor).to_string(),
            operation: Operation::from_token(op),
            key,
        })
    }

    /// Tokenize a plain history: every record advances the sequence index by one.
    pub fn tokenize_history(&self, text: &str) -> Result<Vec<Line>, HistoryError> {
        let mut out = Vec::new();
        for (lineno, raw) in text.lines().enumerate() {
            if is_blank_or_comment(raw) {
                continue;
            }
            let seq = out.len();
            out.push(self.tokenize_line(lineno + 1, seq, raw.trim_end())?);
        }
        Ok(out)
    }

    /// Tokenize the grouped variant, where records between `[` and `]` share
    /// one sequence index.
    pub fn tokenize_grouped(&self, text: &str) -> Result<Vec<Line>, HistoryError> {
        let mut out = Vec::new();
        let mut seq = 0usize;
        // Line number of the `[` currently open, if any.
        let mut group: Option<usize> = None;

        for (lineno, raw) in text.lines().enumerate() {
            let lno = lineno + 1;
            if is_blank_or_comment(raw) {
                continue;
            }

            match strip_comment(raw).trim() {
                "[" => {
                    if group.is_some() {
                        return Err(HistoryError::Grouping {
                            line: lno,
                            message: "groups cannot be nested",
                        });
                    }
                    group = Some(lno);
                }
                "]" => {
                    if group.take().is_none() {
                        return Err(HistoryError::Grouping {
                            line: lno,
                            message: "`]` closes a group that was never opened",
                        });
                    }
                    seq += 1;
                }
                _ => {
                    out.push(self.tokenize_line(lno, seq, raw.trim_end())?);
                    if group.is_none() {
                        seq += 1;
                    }
                }
            }
        }

        if let Some(line) = group {
            return Err(HistoryError::Grouping {
                line,
                message: "`[` is never closed",
            });
        }
        Ok(out)
    }
}

fn is_blank_or_comment(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty() || t.starts_with('#')
}

fn strip_comment(raw: &str) -> &str {
    raw.split_once('#').map_or(raw, |(head, _)| head)
}
