//! Raw token definitions for input lines.
//!
//! The tokens are defined with the logos derive macro. A word is any run of
//! non-whitespace characters where double- and single-quoted segments may be
//! embedded mid-word (`xpath:"//nodes"` is one word). Inside double quotes a
//! backslash escapes the next character; single-quoted segments are verbatim.

use logos::Logos;

/// Tokens produced for one logical input line.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t]+")]
pub enum RawToken {
    /// One shell word, quotes and escapes still in place.
    #[regex(r#"([^ \t'"\\]|\\.|"([^"\\]|\\.)*"|'[^']*')+"#)]
    Word,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(input: &str) -> Vec<String> {
        let mut lexer = RawToken::lexer(input);
        let mut out = Vec::new();
        while let Some(tok) = lexer.next() {
            assert_eq!(tok, Ok(RawToken::Word), "input: {:?}", input);
            out.push(lexer.slice().to_string());
        }
        out
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(words("primitive p1 Dummy"), ["primitive", "p1", "Dummy"]);
    }

    #[test]
    fn test_quoted_segment_glues_to_word() {
        assert_eq!(
            words(r#"xpath:"*[@name=karl]""#),
            [r#"xpath:"*[@name=karl]""#]
        );
    }

    #[test]
    fn test_escaped_quote_inside_double_quotes() {
        assert_eq!(words(r#"state="bo\"o""#), [r#"state="bo\"o""#]);
    }

    #[test]
    fn test_brackets_are_plain_words() {
        assert_eq!(words("[ A B ]"), ["[", "A", "B", "]"]);
    }

    #[test]
    fn test_unbalanced_quote_is_an_error() {
        let mut lexer = RawToken::lexer(r#"params state="bo"#);
        // "params", then "state=" up to the unterminated quote, then the error
        assert_eq!(lexer.next(), Some(Ok(RawToken::Word)));
        assert_eq!(lexer.next(), Some(Ok(RawToken::Word)));
        assert_eq!(lexer.next(), Some(Err(())));
    }
}
