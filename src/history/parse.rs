use crate::history::error::HistoryError;
use crate::history::line::{Line, Operation};
use crate::history::span::{Closing, History, Marker, Span, SpanId};
use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};

/// A span whose closing line has not been seen yet.
#[derive(Debug)]
struct OpenSpan {
    id: SpanId,
    actor: String,
    label: String,
    start: usize,
    line: usize,
    events: Vec<usize>,
}

/// Open spans by key, in opening order.
///
/// A key lives here exactly as long as its span is open; closing removes it,
/// so the key may be reused afterwards.
#[derive(Debug, Default)]
struct SpanTable {
    open: IndexMap<String, OpenSpan>,
}

impl SpanTable {
    /// Most recently opened span of `actor` that is still open.
    fn latest_for(&mut self, actor: &str) -> Option<&mut OpenSpan> {
        self.open.values_mut().rev().find(|s| s.actor == actor)
    }
}

/// Run the span state machine over tokenized lines.
///
/// Lines must be in input order with non-decreasing `seq`.
pub fn parse_history(lines: &[Line]) -> Result<History, HistoryError> {
    let mut table = SpanTable::default();
    let mut actors: IndexSet<String> = IndexSet::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut markers: Vec<Marker> = Vec::new();
    let mut next_id = 0usize;
    let mut new_id = || {
        let id = SpanId(next_id);
        next_id += 1;
        id
    };

    for line in lines {
        if !actors.contains(&line.actor) {
            actors.insert(line.actor.clone());
        }

        let Some(key) = &line.key else {
            match &line.operation {
                Operation::Event => {
                    let open = table.latest_for(&line.actor).ok_or_else(|| {
                        HistoryError::DanglingEvent {
                            line: line.number,
                            actor: line.actor.clone(),
                            key: None,
                        }
                    })?;
                    open.events.push(line.seq);
                }
                Operation::End => {
                    return Err(HistoryError::ReservedOpener {
                        line: line.number,
                        op: "END",
                    });
                }
                Operation::Label(text) => spans.push(Span {
                    id: new_id(),
                    actor: line.actor.clone(),
                    key: None,
                    label: text.clone(),
                    closing: Closing::Point,
                    start: line.seq,
                    end: line.seq,
                }),
            }
            continue;
        };

        let mut entry = match table.open.entry(key.clone()) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(slot) => {
                match &line.operation {
                    Operation::Event => {
                        return Err(HistoryError::DanglingEvent {
                            line: line.number,
                            actor: line.actor.clone(),
                            key: Some(key.clone()),
                        });
                    }
                    Operation::End => {
                        return Err(HistoryError::ReservedOpener {
                            line: line.number,
                            op: "END",
                        });
                    }
                    Operation::Label(text) => {
                        slot.insert(OpenSpan {
                            id: new_id(),
                            actor: line.actor.clone(),
                            label: text.clone(),
                            start: line.seq,
                            line: line.number,
                            events: Vec::new(),
                        });
                    }
                }
                continue;
            }
        };

        let open = entry.get_mut();
        if open.actor != line.actor {
            return Err(HistoryError::DuplicateKey {
                line: line.number,
                key: key.clone(),
                owner: open.actor.clone(),
                actor: line.actor.clone(),
            });
        }

        let closing = match &line.operation {
            Operation::Event => {
                open.events.push(line.seq);
                continue;
            }
            Operation::End => Closing::End,
            Operation::Label(text) => Closing::Label(text.clone()),
        };

        if open.start == line.seq {
            return Err(HistoryError::ZeroLengthSpan {
                line: line.number,
                key: key.clone(),
            });
        }

        let open = entry.shift_remove();
        markers.extend(open.events.iter().map(|&index| Marker {
            actor: open.actor.clone(),
            index,
            span: open.id,
        }));
        spans.push(Span {
            id: open.id,
            actor: open.actor,
            key: Some(key.clone()),
            label: open.label,
            closing,
            start: open.start,
            end: line.seq,
        });
    }

    if let Some((key, open)) = table.open.first() {
        return Err(HistoryError::UnclosedSpan {
            actor: open.actor.clone(),
            key: key.clone(),
            line: open.line,
        });
    }

    spans.sort_by_key(|s| s.id);
    markers.sort_by_key(|m| (m.index, m.span));

    Ok(History {
        actors: actors.into_iter().collect(),
        spans,
        markers,
        steps: lines.last().map_or(0, |l| l.seq + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Tokenizer;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<History, HistoryError> {
        let lines = Tokenizer::new().unwrap().tokenize_history(text).unwrap();
        parse_history(&lines)
    }

    fn point(id: usize, actor: &str, label: &str, at: usize) -> Span {
        Span {
            id: SpanId(id),
            actor: actor.to_string(),
            key: None,
            label: label.to_string(),
            closing: Closing::Point,
            start: at,
            end: at,
        }
    }

    #[test]
    fn keyed_span_with_points_in_between() {
        let h = parse("A: E(x) a\nB: E(y)\nA: END a\nB: D(x)\nA: D(y)\nA: E(z)\n").unwrap();
        assert_eq!(h.actors, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(h.steps, 6);
        assert_eq!(
            h.spans,
            vec![
                Span {
                    id: SpanId(0),
                    actor: "A".to_string(),
                    key: Some("a".to_string()),
                    label: "E(x)".to_string(),
                    closing: Closing::End,
                    start: 0,
                    end: 2,
                },
                point(1, "B", "E(y)", 1),
                point(2, "B", "D(x)", 3),
                point(3, "A", "D(y)", 4),
                point(4, "A", "E(z)", 5),
            ]
        );
        assert!(h.markers.is_empty());
    }

    #[test]
    fn closing_text_becomes_second_label() {
        let h = parse("A: W(A) k\nA: ok k\n").unwrap();
        assert_eq!(h.spans.len(), 1);
        assert_eq!(h.spans[0].label, "W(A)");
        assert_eq!(h.spans[0].closing, Closing::Label("ok".to_string()));
        assert_eq!((h.spans[0].start, h.spans[0].end), (0, 1));
    }

    #[test]
    fn key_reuse_opens_an_independent_span() {
        let h = parse("A: W(1) k\nA: END k\nA: W(2) k\nA: ok k\n").unwrap();
        assert_eq!(h.spans.len(), 2);
        assert_ne!(h.spans[0].id, h.spans[1].id);
        assert_eq!((h.spans[0].start, h.spans[0].end), (0, 1));
        assert_eq!((h.spans[1].start, h.spans[1].end), (2, 3));
        assert_eq!(h.spans[1].label, "W(2)");
    }

    #[test]
    fn closing_frees_only_its_own_key() {
        let err = parse("A: W(1) k\nA: W(2) j\nA: END k\nA: EVENT k\nA: END j\n").unwrap_err();
        assert_eq!(
            err,
            HistoryError::DanglingEvent {
                line: 4,
                actor: "A".to_string(),
                key: Some("k".to_string()),
            }
        );

        let h = parse("A: W(1) k\nA: W(2) j\nA: END k\nA: EVENT\nA: END j\n").unwrap();
        assert_eq!(h.spans.len(), 2);
        assert_eq!(h.markers.len(), 1);
        assert_eq!(h.markers[0].span, SpanId(1));
    }

    #[test]
    fn spans_ordered_by_opening_not_closing() {
        let h = parse("A: outer o\nA: inner i\nA: END i\nA: END o\n").unwrap();
        let labels: Vec<&str> = h.spans.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["outer", "inner"]);
    }

    #[test]
    fn unkeyed_event_attaches_to_latest_open_span() {
        let h = parse("A: outer o\nA: inner i\nA: EVENT\nA: END i\nA: EVENT\nA: END o\n").unwrap();
        assert_eq!(
            h.markers,
            vec![
                Marker {
                    actor: "A".to_string(),
                    index: 2,
                    span: SpanId(1),
                },
                Marker {
                    actor: "A".to_string(),
                    index: 4,
                    span: SpanId(0),
                },
            ]
        );
    }

    #[test]
    fn keyed_event_attaches_to_its_span() {
        let h = parse("A: W(X) a\nA: R(Y) b\nA: EVENT a\nA: ok b\nA: ok a\n").unwrap();
        assert_eq!(h.markers.len(), 1);
        assert_eq!(h.markers[0].span, SpanId(0));
        assert_eq!(h.markers[0].index, 2);
    }

    #[test]
    fn dangling_event_without_open_span() {
        let err = parse("A: EVENT\n").unwrap_err();
        assert_eq!(
            err,
            HistoryError::DanglingEvent {
                line: 1,
                actor: "A".to_string(),
                key: None,
            }
        );
    }

    #[test]
    fn dangling_event_ignores_other_actors() {
        let err = parse("B: W(x) k\nA: EVENT\nB: END k\n").unwrap_err();
        assert!(matches!(err, HistoryError::DanglingEvent { line: 2, .. }));
    }

    #[test]
    fn keyed_event_on_unknown_key_dangles() {
        let err = parse("A: EVENT k\n").unwrap_err();
        assert_eq!(
            err,
            HistoryError::DanglingEvent {
                line: 1,
                actor: "A".to_string(),
                key: Some("k".to_string()),
            }
        );
    }

    #[test]
    fn unclosed_span_reported_in_opening_order() {
        let err = parse("A: W(x) first\nB: W(y) second\nA: x\n").unwrap_err();
        assert_eq!(
            err,
            HistoryError::UnclosedSpan {
                actor: "A".to_string(),
                key: "first".to_string(),
                line: 1,
            }
        );
    }

    #[test]
    fn key_open_for_another_actor_is_duplicate() {
        let err = parse("A: W(x) k\nB: R(x) k\n").unwrap_err();
        assert_eq!(
            err,
            HistoryError::DuplicateKey {
                line: 2,
                key: "k".to_string(),
                owner: "A".to_string(),
                actor: "B".to_string(),
            }
        );
    }

    #[test]
    fn end_cannot_open() {
        assert_eq!(
            parse("A: END k\n").unwrap_err(),
            HistoryError::ReservedOpener { line: 1, op: "END" }
        );
        assert_eq!(
            parse("A: END\n").unwrap_err(),
            HistoryError::ReservedOpener { line: 1, op: "END" }
        );
    }

    #[test]
    fn quoted_reserved_word_is_a_label() {
        let h = parse("A: \"END\"\n").unwrap();
        assert_eq!(h.spans, vec![point(0, "A", "END", 0)]);
    }

    #[test]
    fn grouped_lines_share_start() {
        let lines = Tokenizer::new()
            .unwrap()
            .tokenize_grouped("[\nA: W(A) A\nB: W(B) B\n]\nA: ok A\nB: ok B\n")
            .unwrap();
        let h = parse_history(&lines).unwrap();
        let bounds: Vec<(&str, usize, usize)> = h
            .spans
            .iter()
            .map(|s| (s.actor.as_str(), s.start, s.end))
            .collect();
        assert_eq!(bounds, vec![("A", 0, 1), ("B", 0, 2)]);
        assert_eq!(h.steps, 3);
    }

    #[test]
    fn grouped_open_and_close_is_zero_length() {
        let lines = Tokenizer::new()
            .unwrap()
            .tokenize_grouped("[\nA: W(A) k\nA: ok k\n]\n")
            .unwrap();
        assert_eq!(
            parse_history(&lines).unwrap_err(),
            HistoryError::ZeroLengthSpan {
                line: 3,
                key: "k".to_string(),
            }
        );
    }

    #[test]
    fn every_span_ends_within_the_input() {
        let h = parse("A: a k\nB: b\nB: c j\nA: END k\nB: d j\n").unwrap();
        for s in &h.spans {
            assert!(s.start <= s.end);
            assert!(s.end < h.steps);
            assert_eq!(s.is_point(), s.start == s.end);
        }
    }
}
