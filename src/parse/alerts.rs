//! Alerts.
//!
//! `alert <id> <path>` with optional `attributes`/`meta` sections and
//! recipients. A recipient is either a plain `to <path>` or a braced
//! `to { <path> ... }` carrying its own sections; the brace form is what
//! lets alert-level sections follow a recipient.

use crate::error::{Result, ShellError};
use crate::model::Element;

use super::common::{is_group_marker, parse_attr_set, Cursor};

const ALERT_SECTIONS: &[&str] = &["attributes", "meta", "to"];

pub fn parse_alert(cur: &mut Cursor<'_>) -> Result<Element> {
    let id = cur.expect_word()?;
    let path = cur.expect_word()?;
    if is_group_marker(path) {
        return Err(ShellError::Syntax(path.to_string()));
    }
    let mut el = Element::new("alert");
    el.set_attr("id", id);
    el.set_attr("path", path);
    loop {
        match cur.peek() {
            None => break,
            Some("attributes") => {
                cur.advance();
                let set = parse_attr_set(cur, "instance_attributes", ALERT_SECTIONS, None)?;
                el.push_element(set);
            }
            Some("meta") => {
                cur.advance();
                let set = parse_attr_set(cur, "meta_attributes", ALERT_SECTIONS, None)?;
                el.push_element(set);
            }
            Some("to") => {
                cur.advance();
                el.push_element(parse_recipient(cur)?);
            }
            Some(_) => return Err(cur.err()),
        }
    }
    Ok(el)
}

fn parse_recipient(cur: &mut Cursor<'_>) -> Result<Element> {
    let mut recipient = Element::new("recipient");
    if cur.peek() == Some("{") {
        cur.advance();
        let value = cur.expect_word()?;
        recipient.set_attr("value", value);
        loop {
            match cur.peek() {
                Some("}") => {
                    cur.advance();
                    break;
                }
                Some("attributes") => {
                    cur.advance();
                    let set =
                        parse_attr_set(cur, "instance_attributes", &["attributes", "meta"], None)?;
                    recipient.push_element(set);
                }
                Some("meta") => {
                    cur.advance();
                    let set = parse_attr_set(cur, "meta_attributes", &["attributes", "meta"], None)?;
                    recipient.push_element(set);
                }
                _ => return Err(ShellError::Syntax("}".to_string())),
            }
        }
    } else {
        let value = cur.expect_word()?;
        if is_group_marker(value) {
            return Err(ShellError::Syntax(value.to_string()));
        }
        recipient.set_attr("value", value);
    }
    Ok(recipient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::split_line;

    fn alert(text: &str) -> Result<Element> {
        let toks = split_line(text).unwrap();
        let mut cur = Cursor::new(&toks[1..]);
        parse_alert(&mut cur)
    }

    #[test]
    fn test_simple_alert_with_recipient() {
        let el = alert(r#"alert alert1 "/tmp/foo.sh" to "/tmp/bar.log""#).unwrap();
        assert_eq!(el.attr("path"), Some("/tmp/foo.sh"));
        let recipient = el.first_child("recipient").unwrap();
        assert_eq!(recipient.attr("value"), Some("/tmp/bar.log"));
    }

    #[test]
    fn test_valueless_meta_attribute() {
        let el = alert(r#"alert alert3 "a path here" meta baby to "/tmp/bar.log""#).unwrap();
        assert_eq!(el.attr("path"), Some("a path here"));
        let meta = el.first_child("meta_attributes").unwrap();
        let nv = meta.first_child("nvpair").unwrap();
        assert_eq!(nv.attr("name"), Some("baby"));
        assert_eq!(nv.attr("value"), None);
    }

    #[test]
    fn test_braced_recipient_before_alert_meta() {
        let el = alert(r#"alert alert5 "/a/path" to { "/another/path" } meta timeout=30s"#).unwrap();
        let tags: Vec<&str> = el.child_elements().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, ["recipient", "meta_attributes"]);
    }

    #[test]
    fn test_unclosed_recipient_brace() {
        assert!(matches!(
            alert(r#"alert a "/p" to { "/q" meta x=1"#),
            Err(ShellError::Syntax(_))
        ));
    }
}
