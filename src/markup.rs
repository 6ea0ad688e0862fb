use crate::refs;

/// How a `>>N` reference should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefStyle {
    Normal,
    /// The reference points at the thread's opening post.
    Op,
    /// The reference points at the post framing the current view, in a
    /// message that quotes more than one post.
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Plain,
    /// Greentext: the whole line is a quotation.
    Quote,
    Link(String),
    Reference { id: u64, style: RefStyle },
    /// The small " (OP)" label following a root reference.
    OpTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    pub text: String,
    pub kind: SpanKind,
}

impl MarkupSpan {
    fn new(text: impl Into<String>, kind: SpanKind) -> Self {
        Self { text: text.into(), kind }
    }
}

/// Renders cleaned comment text into a flat span sequence. Lines are
/// separated by plain `"\n"` spans so style boundaries always coincide
/// with text boundaries, whatever the presentation layer truncates.
pub fn render_spans(
    text: &str,
    thread_root_id: u64,
    active_ancestor_id: Option<u64>,
) -> Vec<MarkupSpan> {
    let distinct_refs = refs::extract_references(text).len();
    let mut spans = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            spans.push(MarkupSpan::new("\n", SpanKind::Plain));
        }
        render_line(line, thread_root_id, active_ancestor_id, distinct_refs, &mut spans);
    }
    spans
}

fn render_line(
    line: &str,
    root_id: u64,
    active_id: Option<u64>,
    distinct_refs: usize,
    spans: &mut Vec<MarkupSpan>,
) {
    let base = if line.starts_with('>') && !line.starts_with(">>") {
        SpanKind::Quote
    } else {
        SpanKind::Plain
    };

    let bytes = line.as_bytes();
    let mut i = 0;
    let mut plain_start = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b">>") {
            let mut j = i + 2;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 2 {
                if let Ok(id) = line[i + 2..j].parse::<u64>() {
                    if plain_start < i {
                        spans.push(MarkupSpan::new(&line[plain_start..i], base.clone()));
                    }
                    let style = if id == root_id {
                        RefStyle::Op
                    } else if active_id == Some(id) && distinct_refs > 1 {
                        RefStyle::Active
                    } else {
                        RefStyle::Normal
                    };
                    spans.push(MarkupSpan::new(&line[i..j], SpanKind::Reference { id, style }));
                    if id == root_id {
                        spans.push(MarkupSpan::new(" (OP)", SpanKind::OpTag));
                    }
                    i = j;
                    plain_start = j;
                    continue;
                }
            }
        }
        if bytes[i..].starts_with(b"http://") || bytes[i..].starts_with(b"https://") {
            let mut j = i;
            while j < bytes.len() && !bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if plain_start < i {
                spans.push(MarkupSpan::new(&line[plain_start..i], base.clone()));
            }
            let url = &line[i..j];
            spans.push(MarkupSpan::new(url, SpanKind::Link(url.to_string())));
            i = j;
            plain_start = j;
            continue;
        }
        i += 1;
    }
    if plain_start < line.len() {
        spans.push(MarkupSpan::new(&line[plain_start..], base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_plain_span() {
        let spans = render_spans("nothing special here", 1, None);
        assert_eq!(
            spans,
            vec![MarkupSpan::new("nothing special here", SpanKind::Plain)]
        );
    }

    #[test]
    fn greentext_line_is_one_quote_span() {
        let spans = render_spans(">Implying this works", 1, None);
        assert_eq!(
            spans,
            vec![MarkupSpan::new(">Implying this works", SpanKind::Quote)]
        );
    }

    #[test]
    fn double_sigil_is_not_greentext() {
        let spans = render_spans(">>2 text", 1, None);
        assert_eq!(
            spans,
            vec![
                MarkupSpan::new(">>2", SpanKind::Reference { id: 2, style: RefStyle::Normal }),
                MarkupSpan::new(" text", SpanKind::Plain),
            ]
        );
    }

    #[test]
    fn root_reference_gets_op_tag() {
        let spans = render_spans(">>1 nice", 1, None);
        assert_eq!(
            spans,
            vec![
                MarkupSpan::new(">>1", SpanKind::Reference { id: 1, style: RefStyle::Op }),
                MarkupSpan::new(" (OP)", SpanKind::OpTag),
                MarkupSpan::new(" nice", SpanKind::Plain),
            ]
        );
    }

    #[test]
    fn active_style_needs_multiple_distinct_refs() {
        // Two distinct quotes: the active ancestor's gets the alternate style.
        let spans = render_spans(">>2 >>3", 1, Some(3));
        assert_eq!(
            spans,
            vec![
                MarkupSpan::new(">>2", SpanKind::Reference { id: 2, style: RefStyle::Normal }),
                MarkupSpan::new(" ", SpanKind::Plain),
                MarkupSpan::new(">>3", SpanKind::Reference { id: 3, style: RefStyle::Active }),
            ]
        );
        // A single quote stays normal even when it matches the ancestor.
        let spans = render_spans(">>3 hey", 1, Some(3));
        assert_eq!(
            spans[0],
            MarkupSpan::new(">>3", SpanKind::Reference { id: 3, style: RefStyle::Normal })
        );
    }

    #[test]
    fn root_wins_over_active() {
        let spans = render_spans(">>1 >>2", 1, Some(1));
        assert_eq!(
            spans[0],
            MarkupSpan::new(">>1", SpanKind::Reference { id: 1, style: RefStyle::Op })
        );
    }

    #[test]
    fn urls_become_link_spans() {
        let spans = render_spans("see https://example.com/x for details", 1, None);
        assert_eq!(
            spans,
            vec![
                MarkupSpan::new("see ", SpanKind::Plain),
                MarkupSpan::new(
                    "https://example.com/x",
                    SpanKind::Link("https://example.com/x".into())
                ),
                MarkupSpan::new(" for details", SpanKind::Plain),
            ]
        );
    }

    #[test]
    fn url_on_greentext_line_overrides_base_style() {
        let spans = render_spans(">quoted http://a.b rest", 1, None);
        assert_eq!(
            spans,
            vec![
                MarkupSpan::new(">quoted ", SpanKind::Quote),
                MarkupSpan::new("http://a.b", SpanKind::Link("http://a.b".into())),
                MarkupSpan::new(" rest", SpanKind::Quote),
            ]
        );
    }

    #[test]
    fn lines_are_separated_by_newline_spans() {
        let spans = render_spans("one\n>two", 1, None);
        assert_eq!(
            spans,
            vec![
                MarkupSpan::new("one", SpanKind::Plain),
                MarkupSpan::new("\n", SpanKind::Plain),
                MarkupSpan::new(">two", SpanKind::Quote),
            ]
        );
    }

    #[test]
    fn span_texts_reassemble_the_input() {
        let text = ">>1 hi\n>green https://x.y\nplain >>23 tail";
        let joined: String = render_spans(text, 1, None)
            .iter()
            .filter(|s| s.kind != SpanKind::OpTag)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(joined, text);
    }
}
