//! Word splitting and unquoting for logical lines.

use logos::Logos;

use crate::error::{Result, ShellError};
use crate::lexing::tokens::RawToken;

/// Split one logical line into unquoted word tokens.
///
/// An unbalanced quote is a syntax error naming the offending remainder of
/// the line.
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut lexer = RawToken::lexer(line);
    let mut words = Vec::new();
    while let Some(tok) = lexer.next() {
        match tok {
            Ok(RawToken::Word) => words.push(unquote(lexer.slice())),
            Err(()) => {
                return Err(ShellError::Syntax(line[lexer.span().start..].to_string()));
            }
        }
    }
    Ok(words)
}

/// Remove quoting from one raw word.
///
/// Outside quotes a backslash escapes the next character. Inside double
/// quotes a backslash escapes `"` and `\` and is otherwise literal; single
/// quoted segments are taken verbatim. The lexer only hands us balanced
/// words, so dangling quote states cannot occur here.
fn unquote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(esc) = chars.next() {
                    out.push(esc);
                }
            }
            '"' => {
                while let Some(d) = chars.next() {
                    match d {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(e @ ('"' | '\\')) => out.push(e),
                            Some(e) => {
                                out.push('\\');
                                out.push(e);
                            }
                            None => {}
                        },
                        other => out.push(other),
                    }
                }
            }
            '\'' => {
                for d in chars.by_ref() {
                    if d == '\'' {
                        break;
                    }
                    out.push(d);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Quote a word for re-emission if it contains whitespace, quotes, a
/// backslash, or is empty; otherwise return it verbatim.
pub fn requote(word: &str) -> String {
    let needs_quoting = word.is_empty()
        || word
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\');
    if !needs_quoting {
        return word.to_string();
    }
    let mut out = String::with_capacity(word.len() + 2);
    out.push('"');
    for c in word.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Reassemble a word list into a canonical single-space-separated line.
pub fn detokenize(words: &[String]) -> String {
    words
        .iter()
        .map(|w| requote(w))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(
            split_line("colocation foo inf: a b").unwrap(),
            ["colocation", "foo", "inf:", "a", "b"]
        );
    }

    #[test]
    fn test_split_unquotes_double() {
        assert_eq!(
            split_line(r#"alert alert1 "/tmp/foo.sh""#).unwrap(),
            ["alert", "alert1", "/tmp/foo.sh"]
        );
    }

    #[test]
    fn test_split_unquotes_glued() {
        assert_eq!(
            split_line(r#"params state="bo'o""#).unwrap(),
            ["params", "state=bo'o"]
        );
        assert_eq!(
            split_line(r#"params state="bo\"o""#).unwrap(),
            ["params", r#"state=bo"o"#]
        );
    }

    #[test]
    fn test_split_keeps_path_text_verbatim() {
        assert_eq!(
            split_line(r#"alert alert3 "a path here""#).unwrap(),
            ["alert", "alert3", "a path here"]
        );
    }

    #[test]
    fn test_split_unbalanced_quote_names_remainder() {
        let err = split_line(r#"primitive p1 Dummy params state="oops"#).unwrap_err();
        assert_eq!(err, ShellError::Syntax(r#""oops"#.to_string()));
    }

    #[test]
    fn test_requote() {
        assert_eq!(requote("plain"), "plain");
        assert_eq!(requote("a path here"), r#""a path here""#);
        assert_eq!(requote(r#"bo"o"#), r#""bo\"o""#);
        assert_eq!(requote(""), r#""""#);
    }

    #[test]
    fn test_requote_escapes_backslashes() {
        assert_eq!(requote(r"a\b"), r#""a\\b""#);
        let words = vec![r"a\b".to_string()];
        assert_eq!(split_line(&detokenize(&words)).unwrap(), words);
    }

    #[test]
    fn test_detokenize_requotes_only_what_needs_it() {
        let words = split_line(r#"alert alert3 "a path here" meta baby"#).unwrap();
        assert_eq!(detokenize(&words), r#"alert alert3 "a path here" meta baby"#);
    }
}
