//! `{placeholder}` scanning and substitution
//!
//! A placeholder is `{` + identifier + `}`, where the identifier starts with
//! an ASCII letter or `_` and continues with letters, digits or `_`. Any
//! other brace is literal text, so JSON snippets and `{ spaced }` words pass
//! through untouched. There is no escape syntax.

use std::collections::HashMap;
use twin_error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn segments(template: &str) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(len) = placeholder_len(&bytes[i + 1..]) {
                if text_start < i {
                    segments.push(Segment::Text(&template[text_start..i]));
                }
                segments.push(Segment::Placeholder(&template[i + 1..i + 1 + len]));
                i += len + 2;
                text_start = i;
                continue;
            }
        }
        i += 1;
    }

    if text_start < bytes.len() {
        segments.push(Segment::Text(&template[text_start..]));
    }
    segments
}

/// Length of the identifier at the start of `rest` if it is closed by `}`
fn placeholder_len(rest: &[u8]) -> Option<usize> {
    let first = *rest.first()?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let len = rest
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    (rest.get(len) == Some(&b'}')).then_some(len)
}

/// Placeholder names in `template`, each once, in order of first appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for segment in segments(template) {
        if let Segment::Placeholder(name) = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Substitute every placeholder in `template`.
///
/// Fails with `MissingParameter` naming every unbound placeholder; nothing
/// is substituted in that case. Bound values are inserted verbatim and are
/// not scanned again.
pub fn render(template: &str, bindings: &HashMap<String, String>) -> Result<String> {
    let missing: Vec<&str> = placeholders(template)
        .into_iter()
        .filter(|name| !bindings.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(Error::missing_parameters(missing));
    }

    let mut out = String::with_capacity(template.len());
    for segment in segments(template) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                if let Some(value) = bindings.get(name) {
                    out.push_str(value);
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_error::ErrorKind;

    fn bind(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_finds_placeholders_in_order() {
        let names = placeholders("Hi {name}, about {question} and {name} again. {_x1}");
        assert_eq!(names, vec!["name", "question", "_x1"]);
    }

    #[test]
    fn test_non_identifiers_are_literal() {
        let template = r#"{"json": true} { spaced } {1abc} {} {{question}} {open"#;
        assert_eq!(placeholders(template), vec!["question"]);

        let rendered = render(template, &bind(&[("question", "Q")])).unwrap();
        assert_eq!(rendered, r#"{"json": true} { spaced } {1abc} {} {Q} {open"#);
    }

    #[test]
    fn test_render_substitutes_everything() {
        let rendered = render(
            "Answer the following question about me: {question}\n({question})",
            &bind(&[("question", "What do I cook?"), ("unused", "x")]),
        )
        .unwrap();
        assert_eq!(
            rendered,
            "Answer the following question about me: What do I cook?\n(What do I cook?)"
        );
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let rendered = render("{a}", &bind(&[("a", "{b}")])).unwrap();
        assert_eq!(rendered, "{b}");
    }

    #[test]
    fn test_missing_lists_every_name() {
        let err = render("{question} for {owner} by {agent}", &bind(&[("owner", "me")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingParameter);
        assert!(err.message().contains("'question'"));
        assert!(err.message().contains("'agent'"));
        assert!(!err.message().contains("'owner'"));
    }

    #[test]
    fn test_unicode_text_survives() {
        let rendered = render("❓ {q} — ok ✅", &bind(&[("q", "café?")])).unwrap();
        assert_eq!(rendered, "❓ café? — ok ✅");
    }

    #[test]
    fn test_template_without_placeholders() {
        assert!(placeholders("plain text").is_empty());
        assert_eq!(render("plain text", &HashMap::new()).unwrap(), "plain text");
        assert_eq!(render("", &HashMap::new()).unwrap(), "");
    }
}
