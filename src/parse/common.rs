//! Shared parsing machinery: the token cursor, nv-pair forms, score
//! conversion, and the keyword-section loop used by every attribute set.

use crate::error::{Result, ShellError};
use crate::model::Element;
use crate::schema::Schema;

use super::rules;

/// Cursor over the token slice of one command.
pub struct Cursor<'a> {
    toks: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(toks: &'a [String]) -> Self {
        Cursor { toks, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.toks.get(self.pos).map(|s| s.as_str())
    }

    pub fn next(&mut self) -> Option<&'a str> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub fn advance(&mut self) {
        self.pos += 1;
    }

    pub fn done(&self) -> bool {
        self.pos >= self.toks.len()
    }

    /// The unconsumed remainder.
    pub fn remainder(&self) -> &'a [String] {
        &self.toks[self.pos.min(self.toks.len())..]
    }

    pub fn all_from(&self, pos: usize) -> &'a [String] {
        &self.toks[pos.min(self.toks.len())..]
    }

    /// Syntax error naming the unconsumed remainder.
    pub fn err(&self) -> ShellError {
        ShellError::syntax_at(self.remainder())
    }

    /// Next token, or a syntax error at the current position.
    pub fn expect_word(&mut self) -> Result<&'a str> {
        self.next().ok_or(ShellError::Syntax(String::new()))
    }
}

/// One name/value token in its parsed form.
#[derive(Debug, Clone, PartialEq)]
pub enum Nv {
    /// `name=value`, `name` (valueless), or `$id:name=value` (pinned id).
    Pair {
        id: Option<String>,
        name: String,
        value: Option<String>,
    },
    /// `@id` or `@id:name` — a value substitution kept symbolic as `id-ref`.
    Ref { idref: String, name: Option<String> },
}

/// Group markers arrive as ordinary one-character tokens; they are never
/// nv material.
pub fn is_group_marker(tok: &str) -> bool {
    matches!(tok, "[" | "]" | "{" | "}")
}

/// Classify one token as an nv form, if it is one.
pub fn parse_nv(tok: &str) -> Option<Nv> {
    if tok.is_empty() || is_group_marker(tok) {
        return None;
    }
    if let Some(rest) = tok.strip_prefix('@') {
        if rest.is_empty() {
            return None;
        }
        let (idref, name) = match rest.split_once(':') {
            Some((id, n)) => (id.to_string(), Some(n.to_string())),
            None => (rest.to_string(), None),
        };
        return Some(Nv::Ref { idref, name });
    }
    if let Some(rest) = tok.strip_prefix('$') {
        // $id:name=value; a plain $name=value (e.g. $role=...) is not ours
        if let Some((left, value)) = rest.split_once('=') {
            if let Some((id, name)) = left.split_once(':') {
                return Some(Nv::Pair {
                    id: Some(id.to_string()),
                    name: name.to_string(),
                    value: Some(value.to_string()),
                });
            }
        }
        return None;
    }
    match tok.split_once('=') {
        Some((name, value)) => Some(Nv::Pair {
            id: None,
            name: name.to_string(),
            value: Some(value.to_string()),
        }),
        None => Some(Nv::Pair {
            id: None,
            name: tok.to_string(),
            value: None,
        }),
    }
}

/// `inf`/`-inf` to the canonical INFINITY spellings; numbers pass through.
pub fn score_from_cli(s: &str) -> String {
    match s {
        "inf" | "+inf" => "INFINITY".to_string(),
        "-inf" => "-INFINITY".to_string(),
        other => other.to_string(),
    }
}

pub fn score_to_cli(s: &str) -> String {
    match s {
        "INFINITY" | "+INFINITY" => "inf".to_string(),
        "-INFINITY" => "-inf".to_string(),
        other => other.to_string(),
    }
}

/// `foo:` -> `foo`. Only a trailing colon counts; `pattern:x` is not a
/// colon token.
pub fn strip_colon(tok: &str) -> Option<&str> {
    tok.strip_suffix(':')
        .filter(|p| !p.is_empty() && !p.contains(':'))
}

pub fn is_score(s: &str) -> bool {
    if matches!(s, "inf" | "+inf" | "-inf") {
        return true;
    }
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_priority(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Parse one attribute set: an optional `<priority>:` prefix, then nv pairs
/// and `rule` blocks until the next recognized section keyword or end of
/// input. When `normalize` carries the schema oracle and an agent type,
/// dashed parameter names are rewritten to their underscored form iff the
/// oracle recognizes the underscored name.
pub fn parse_attr_set(
    cur: &mut Cursor<'_>,
    tag: &str,
    sections: &[&str],
    normalize: Option<(&dyn Schema, &str)>,
) -> Result<Element> {
    let mut set = Element::new(tag);
    if let Some(priority) = cur.peek().and_then(strip_colon).filter(|p| is_priority(p)) {
        set.set_attr("score", priority);
        cur.advance();
    }
    loop {
        let tok = match cur.peek() {
            None => break,
            Some(t) => t,
        };
        if sections.contains(&tok) {
            break;
        }
        if tok == "rule" {
            cur.advance();
            let rule = rules::parse_rule(cur)?;
            set.push_element(rule);
            continue;
        }
        let nv = match parse_nv(tok) {
            Some(nv) => nv,
            None => break,
        };
        cur.advance();
        match nv {
            Nv::Pair { id, name, value } => {
                let mut nvpair = Element::new("nvpair");
                if let Some(id) = id {
                    nvpair.set_attr("id", &id);
                }
                let name = match normalize {
                    Some((schema, agent)) if name.contains('-') => {
                        let underscored = name.replace('-', "_");
                        if schema.is_known_parameter(agent, &underscored) {
                            underscored
                        } else {
                            name
                        }
                    }
                    _ => name,
                };
                nvpair.set_attr("name", &name);
                if let Some(value) = value {
                    nvpair.set_attr("value", &value);
                }
                set.push_element(nvpair);
            }
            Nv::Ref { idref, name } => {
                let mut nvpair = Element::new("nvpair");
                nvpair.set_attr("id-ref", &idref);
                if let Some(name) = name {
                    nvpair.set_attr("name", &name);
                }
                set.push_element(nvpair);
            }
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StaticSchema;

    #[test]
    fn test_parse_nv_forms() {
        assert_eq!(
            parse_nv("a=b"),
            Some(Nv::Pair {
                id: None,
                name: "a".to_string(),
                value: Some("b".to_string())
            })
        );
        assert_eq!(
            parse_nv("baby"),
            Some(Nv::Pair {
                id: None,
                name: "baby".to_string(),
                value: None
            })
        );
        assert_eq!(
            parse_nv("$fiz:buz=bin"),
            Some(Nv::Pair {
                id: Some("fiz".to_string()),
                name: "buz".to_string(),
                value: Some("bin".to_string())
            })
        );
        assert_eq!(
            parse_nv("@fiz:boz"),
            Some(Nv::Ref {
                idref: "fiz".to_string(),
                name: Some("boz".to_string())
            })
        );
        assert_eq!(parse_nv("["), None);
        assert_eq!(parse_nv("$role=Started"), None);
    }

    #[test]
    fn test_scores() {
        assert_eq!(score_from_cli("inf"), "INFINITY");
        assert_eq!(score_to_cli("INFINITY"), "inf");
        assert_eq!(score_from_cli("100"), "100");
        assert!(is_score("-inf"));
        assert!(is_score("500"));
        assert!(!is_score("Mandatory"));
    }

    #[test]
    fn test_strip_colon() {
        assert_eq!(strip_colon("inf:"), Some("inf"));
        assert_eq!(strip_colon("pattern:green.*"), None);
        assert_eq!(strip_colon(":"), None);
    }

    #[test]
    fn test_attr_set_normalization_consults_oracle() {
        let schema = StaticSchema::with_entries(&[("Xen", &["shutdown_timeout"])]);
        let toks: Vec<String> = ["shutdown-timeout=0", "other-param=1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut cur = Cursor::new(&toks);
        let set = parse_attr_set(
            &mut cur,
            "instance_attributes",
            &["params", "meta", "op"],
            Some((&schema, "Xen")),
        )
        .unwrap();
        let names: Vec<&str> = set
            .child_elements()
            .map(|nv| nv.attr("name").unwrap())
            .collect();
        assert_eq!(names, ["shutdown_timeout", "other-param"]);
    }

    #[test]
    fn test_attr_set_priority_prefix() {
        let toks: Vec<String> = ["3:", "interface=eth1"].iter().map(|s| s.to_string()).collect();
        let mut cur = Cursor::new(&toks);
        let set = parse_attr_set(&mut cur, "instance_attributes", &["params"], None).unwrap();
        assert_eq!(set.attr("score"), Some("3"));
    }
}
