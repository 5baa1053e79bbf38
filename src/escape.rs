/// Escape plain text so LaTeX typesets every character literally.
///
/// Braces become `\{` / `\}`, a backslash becomes `\textbackslash{}`, `~`
/// and `^` become their text-mode glyph commands, and `% & $ # _` get a
/// backslash prefix. Each input character is rewritten at most once, so the
/// backslashes and braces introduced here are never escaped a second time.
///
/// Only apply this to raw text leaves. Output already assembled from LaTeX
/// commands must not go through it again.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '%' | '&' | '$' | '#' | '_' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_latex;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn braces() {
        assert_eq!(escape_latex("{x}"), "\\{x\\}");
    }

    #[test]
    fn backslash_is_not_reescaped() {
        assert_eq!(escape_latex("a\\b"), "a\\textbackslash{}b");
        assert_eq!(escape_latex("\\{"), "\\textbackslash{}\\{");
    }

    #[test]
    fn tilde_and_caret() {
        assert_eq!(
            escape_latex("~/x^2"),
            "\\textasciitilde{}/x\\textasciicircum{}2"
        );
    }

    #[test]
    fn prefixed_specials() {
        assert_eq!(escape_latex("50% & $5 #1 a_b"), "50\\% \\& \\$5 \\#1 a\\_b");
    }

    #[test]
    fn unicode_passes_through() {
        assert_eq!(escape_latex("café – naïve"), "café – naïve");
    }

    proptest! {
        #[test]
        fn prop_plain_text_is_identity(s in "[a-zA-Z0-9 .,;:!?()'\"/\\-]*") {
            prop_assert_eq!(escape_latex(&s), s);
        }

        #[test]
        fn prop_no_bare_specials_survive(s in ".*") {
            let escaped = escape_latex(&s);
            // Every special must now be preceded by a backslash or be part of
            // a glyph command; stripping the known escapes leaves none behind.
            let stripped = escaped
                .replace("\\textbackslash{}", "")
                .replace("\\textasciitilde{}", "")
                .replace("\\textasciicircum{}", "")
                .replace("\\{", "")
                .replace("\\}", "")
                .replace("\\%", "")
                .replace("\\&", "")
                .replace("\\$", "")
                .replace("\\#", "")
                .replace("\\_", "");
            for special in ['{', '}', '\\', '~', '^', '%', '&', '$', '#', '_'] {
                prop_assert!(!stripped.contains(special), "{:?} left in {:?}", special, escaped);
            }
        }
    }
}
