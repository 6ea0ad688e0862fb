/// Turns the API's HTML-escaped comment field into plain display text:
/// `<br>` becomes a newline, every other tag is stripped, entities are
/// decoded in a single pass, and the result is trimmed.
pub fn clean(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let with_breaks = raw.replace("<br>", "\n");
    let stripped = strip_tags(&with_breaks);
    decode_entities(&stripped).trim().to_string()
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                // A lone '<' with no closing '>' is not a tag, keep it.
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

const NAMED_ENTITIES: &[(&str, char)] = &[
    ("&quot;", '"'),
    ("&amp;", '&'),
    ("&#039;", '\''),
    ("&apos;", '\''),
    ("&gt;", '>'),
    ("&lt;", '<'),
    ("&nbsp;", '\u{a0}'),
    ("&trade;", '™'),
    ("&copy;", '©'),
    ("&reg;", '®'),
];

// Single left-to-right pass: decoded output is never re-scanned, so
// running clean() on already-clean text leaves it unchanged.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        for (name, ch) in NAMED_ENTITIES {
            if tail.starts_with(name) {
                out.push(*ch);
                rest = &tail[name.len()..];
                continue 'outer;
            }
        }
        if let Some(numeric) = tail.strip_prefix("&#") {
            let digits = numeric
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .count();
            if digits > 0 && numeric[digits..].starts_with(';') {
                if let Some(ch) = numeric[..digits]
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                {
                    out.push(ch);
                    rest = &numeric[digits + 1..];
                    continue;
                }
            }
        }
        out.push('&');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}
