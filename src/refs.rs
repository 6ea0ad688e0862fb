/// Collects the post IDs quoted in a comment, in first-occurrence order.
///
/// Both marker spellings count: the literal `>>123` and the
/// entity-encoded `&gt;&gt;123` the API ships before sanitizing.
/// Matching is non-overlapping left-to-right and a digit run is consumed
/// whole by the marker that reaches it first.
pub fn extract_references(text: &str) -> Vec<u64> {
    let bytes = text.as_bytes();
    let mut ids: Vec<u64> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let after = if bytes[i..].starts_with(b">>") {
            i + 2
        } else if bytes[i..].starts_with(b"&gt;&gt;") {
            i + 8
        } else {
            i += 1;
            continue;
        };
        let mut j = after;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > after {
            if let Ok(id) = text[after..j].parse::<u64>() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    ids
}

/// Like [`extract_references`] but drops quotes of the post's own ID.
pub fn extract_references_for(own_id: u64, text: &str) -> Vec<u64> {
    let mut ids = extract_references(text);
    ids.retain(|&id| id != own_id);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_spellings_in_order() {
        assert_eq!(extract_references(">>123 hello &gt;&gt;456"), vec![123, 456]);
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        assert_eq!(extract_references(">>5 >>7 >>5"), vec![5, 7]);
    }

    #[test]
    fn markers_matched_anywhere_in_line() {
        assert_eq!(extract_references("see>>42, also mid&gt;&gt;43text"), vec![42, 43]);
    }

    #[test]
    fn triple_angle_still_matches_inner_marker() {
        assert_eq!(extract_references(">>>123"), vec![123]);
    }

    #[test]
    fn no_markers_yields_empty() {
        assert_eq!(extract_references(""), Vec::<u64>::new());
        assert_eq!(extract_references("just some text > not a quote"), Vec::<u64>::new());
        assert_eq!(extract_references(">> 99"), Vec::<u64>::new());
    }

    #[test]
    fn self_reference_excluded() {
        assert_eq!(extract_references_for(10, ">>10 >>11"), vec![11]);
        assert_eq!(extract_references_for(10, ">>10"), Vec::<u64>::new());
    }

    #[test]
    fn non_ascii_text_does_not_break_scanning() {
        assert_eq!(extract_references("héllo →→ >>77"), vec![77]);
    }
}
