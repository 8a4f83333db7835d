//! Parenthesis-aware semicolon splitter for the Level-4 field.
//!
//! Semicolons only separate terms at paren depth 0, so a term such as
//! `3-Layer Vector DB (Evidence; Implication; Playbook)` stays whole.

/// Split a Level-4 value into trimmed, non-empty terms.
///
/// - `(` opens a group, `)` closes one; depth never drops below zero, so a
///   stray `)` is kept as literal text.
/// - An unclosed `(` keeps everything after it in the same segment.
/// - Empty segments (leading, trailing, or doubled `;`) are dropped.
///
/// ```
/// use taxonomy_normalize::split_level4;
///
/// assert_eq!(split_level4("A; B; C"), ["A", "B", "C"]);
/// assert_eq!(split_level4("Foo (a; b); Bar"), ["Foo (a; b)", "Bar"]);
/// ```
pub fn split_level4(value: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for ch in value.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ';' if depth == 0 => {
                push_segment(&mut terms, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_segment(&mut terms, &current);

    terms
}

fn push_segment(terms: &mut Vec<String>, segment: &str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        terms.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_split() {
        assert_eq!(split_level4("A; B; C"), ["A", "B", "C"]);
    }

    #[test]
    fn no_semicolon() {
        assert_eq!(split_level4("Single Term"), ["Single Term"]);
    }

    #[test]
    fn preserves_parenthesized_semicolons() {
        assert_eq!(
            split_level4("3-Layer Vector DB (Evidence; Implication; Playbook)"),
            ["3-Layer Vector DB (Evidence; Implication; Playbook)"]
        );
    }

    #[test]
    fn mixed_parens_and_split() {
        assert_eq!(split_level4("Foo (a; b); Bar"), ["Foo (a; b)", "Bar"]);
    }

    #[test]
    fn nested_parens() {
        assert_eq!(split_level4("A (B (C; D)); E"), ["A (B (C; D))", "E"]);
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert!(split_level4("").is_empty());
        assert!(split_level4("   ").is_empty());
        assert!(split_level4(" ; ;; ").is_empty());
    }

    #[test]
    fn trims_and_drops_empty_segments() {
        assert_eq!(split_level4("  A  ;  B  ;  C  "), ["A", "B", "C"]);
        assert_eq!(split_level4("A;; B; ; C"), ["A", "B", "C"]);
    }

    #[test]
    fn multiple_parenthetical_groups() {
        assert_eq!(
            split_level4("A (x; y); B (p; q); C"),
            ["A (x; y)", "B (p; q)", "C"]
        );
    }

    #[test]
    fn unclosed_paren_keeps_tail_together() {
        assert_eq!(split_level4("A (unclosed; B; C"), ["A (unclosed; B; C"]);
    }

    #[test]
    fn stray_close_paren_is_clamped() {
        assert_eq!(split_level4("A ); B; C"), ["A )", "B", "C"]);
        assert_eq!(split_level4(")))(a; b)"), [")))(a; b)"]);
    }

    #[test]
    fn edge_cases() {
        let cases: &[(&str, &[&str])] = &[
            ("A", &["A"]),
            ("A;", &["A"]),
            (";A", &["A"]),
            ("A;B", &["A", "B"]),
            ("(A; B)", &["(A; B)"]),
            ("();A", &["()", "A"]),
        ];
        for (input, expected) in cases {
            assert_eq!(split_level4(input), *expected, "input: {input:?}");
        }
    }

    #[test]
    fn balanced_input_without_top_level_semicolon_is_one_trimmed_term() {
        for input in ["  K-Means ", "Transformer (Attention; Self-Attention)", "a (b (c; d) e)"] {
            assert_eq!(split_level4(input), [input.trim()]);
        }
    }

    #[test]
    fn never_panics_on_deep_or_unbalanced_nesting() {
        let deep_open = "(".repeat(10_000) + ";x";
        assert_eq!(split_level4(&deep_open).len(), 1);

        let deep_close = ")".repeat(10_000) + ";x";
        assert_eq!(split_level4(&deep_close), [")".repeat(10_000), "x".to_string()]);
    }
}
