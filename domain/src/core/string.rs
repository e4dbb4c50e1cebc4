//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Case-insensitive substring search
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Strip leading markdown block decoration: quotes, headings and list bullets.
pub fn strip_markdown_prefix(line: &str) -> &str {
    line.trim_start()
        .trim_start_matches(|c: char| matches!(c, '>' | '#' | '-' | '+') || c.is_whitespace())
}

/// Split a `Label: rest` or `[Label] rest` line into its label and remainder.
///
/// Leading whitespace and emphasis markers are ignored, so `**Label**: rest`
/// and `**Label:** rest` are recognised too. Block decoration (quotes,
/// bullets, headings) is *not* stripped here; callers that accept it run
/// [`strip_markdown_prefix`] first.
pub fn labeled_line(line: &str) -> Option<(&str, &str)> {
    const MAX_LABEL_LEN: usize = 64;

    let line = line
        .trim_start()
        .trim_start_matches(|c: char| matches!(c, '*' | '_'));

    if let Some(inner) = line.strip_prefix('[') {
        let end = inner.find(']')?;
        let label = inner[..end].trim();
        let rest = inner[end + 1..]
            .trim_start()
            .trim_start_matches(':')
            .trim();
        return (!label.is_empty()).then_some((label, rest));
    }

    let colon = line.find(':')?;
    let label = line[..colon]
        .trim_end()
        .trim_end_matches(|c: char| matches!(c, '*' | '_'))
        .trim();
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return None;
    }
    let rest = line[colon + 1..]
        .trim_start_matches(|c: char| matches!(c, '*' | '_'))
        .trim();
    Some((label, rest))
}
