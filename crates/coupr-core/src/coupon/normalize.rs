//! Whitespace normalization for OCR text.

/// Normalize a single line: non-breaking spaces become spaces, runs of
/// horizontal whitespace collapse to one space, and the ends are trimmed.
pub fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;

    for c in line.chars() {
        if is_horizontal_space(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

/// Split text into normalized, non-empty lines.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(normalize_line)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Normalize text while keeping line breaks as the only separators.
pub fn normalize_text(text: &str) -> String {
    normalize_lines(text).join("\n")
}

// Unicode White_Space already covers NBSP and the narrow/figure spaces.
fn is_horizontal_space(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_collapses_whitespace() {
        assert_eq!(
            normalize_line("  20%\u{00a0}\u{00a0}OFF \t any  entree "),
            "20% OFF any entree"
        );
    }

    #[test]
    fn test_normalize_lines_drops_empty() {
        let text = "SUBWAY\r\n\n   \n123 Main St.\n";
        assert_eq!(normalize_lines(text), vec!["SUBWAY", "123 Main St."]);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_lines("").is_empty());
        assert_eq!(normalize_text(" \n \u{00a0} "), "");
    }
}
