use serde::Serialize;

/// What a single history line asks for.
///
/// `END` and `EVENT` are only reserved when written bare; a quoted `"END"`
/// is an ordinary label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Operation {
    Label(String),
    End,
    Event,
}

impl Operation {
    pub fn from_token(raw: &str) -> Self {
        match raw {
            "END" => Operation::End,
            "EVENT" => Operation::Event,
            _ => Operation::Label(unquote(raw).to_string()),
        }
    }
}

/// One tokenized input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    /// 1-based line number in the source text.
    pub number: usize,
    /// Sequence index (horizontal slot) this record occupies.
    pub seq: usize,
    pub actor: String,
    pub operation: Operation,
    pub key: Option<String>,
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_only_when_bare() {
        assert_eq!(Operation::from_token("END"), Operation::End);
        assert_eq!(Operation::from_token("EVENT"), Operation::Event);
        assert_eq!(
            Operation::from_token("\"END\""),
            Operation::Label("END".to_string())
        );
        assert_eq!(
            Operation::from_token("end"),
            Operation::Label("end".to_string())
        );
    }

    #[test]
    fn unquote_strips_a_single_pair() {
        assert_eq!(unquote("\"read x\""), "read x");
        assert_eq!(unquote("W(x)"), "W(x)");
        assert_eq!(unquote("\"open"), "\"open");
    }
}
