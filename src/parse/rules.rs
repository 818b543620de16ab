//! Rule expressions.
//!
//! A rule is a tree of boolean predicates over attributes of the evaluating
//! node: comparison expressions, defined/not_defined tests, and date
//! expressions with interval semantics (`date in start=<d> end=<d>`),
//! composed with `and`/`or`. Inside a `params` section the rule ends at the
//! first token that is neither an expression head nor a connective; the
//! tokens after it belong to the enclosing attribute set.

use crate::error::{Result, ShellError};
use crate::model::Element;

use super::common::{is_score, parse_nv, score_from_cli, strip_colon, Cursor, Nv};

const BINARY_OPS: &[&str] = &["eq", "ne", "lt", "gt", "lte", "gte", "in_range"];
const UNARY_OPS: &[&str] = &["defined", "not_defined"];

/// Parse one rule; the `rule` keyword itself is already consumed.
pub fn parse_rule(cur: &mut Cursor<'_>) -> Result<Element> {
    let mut rule = Element::new("rule");
    if let Some(role) = cur.peek().and_then(|t| t.strip_prefix("$role=")) {
        rule.set_attr("role", role);
        cur.advance();
    }
    if let Some(score) = cur.peek().and_then(strip_colon).filter(|p| is_score(p)) {
        rule.set_attr("score", &score_from_cli(score));
        cur.advance();
    }
    let mut boolean_op: Option<&str> = None;
    loop {
        let expr = parse_expression(cur)?;
        rule.push_element(expr);
        let connective = match cur.peek() {
            Some(c @ ("and" | "or")) => c,
            _ => break,
        };
        match boolean_op {
            Some(prev) if prev != connective => {
                return Err(ShellError::Semantic(format!(
                    "inconsistent rule: mixes '{}' and '{}'",
                    prev, connective
                )));
            }
            _ => boolean_op = Some(connective),
        }
        cur.advance();
    }
    if let Some(op) = boolean_op {
        rule.set_attr("boolean-op", op);
    }
    Ok(rule)
}

fn parse_expression(cur: &mut Cursor<'_>) -> Result<Element> {
    let head = cur.peek().ok_or_else(|| cur.err())?;
    if head == "date" {
        cur.advance();
        return parse_date_expression(cur);
    }
    if UNARY_OPS.contains(&head) {
        cur.advance();
        let attribute = cur.expect_word()?;
        let mut expr = Element::new("expression");
        expr.set_attr("operation", head);
        expr.set_attr("attribute", attribute);
        return Ok(expr);
    }
    let attribute = head;
    cur.advance();
    let op = cur.expect_word()?;
    if !BINARY_OPS.contains(&op) {
        return Err(ShellError::Syntax(format!("{} {}", attribute, op)));
    }
    let raw_value = cur.expect_word()?;
    let mut expr = Element::new("expression");
    expr.set_attr("attribute", attribute);
    expr.set_attr("operation", op);
    let (value, value_type) = split_typed_value(raw_value);
    expr.set_attr("value", value);
    if let Some(t) = value_type {
        expr.set_attr("type", t);
    }
    Ok(expr)
}

/// `number:5` / `version:1.2` carry an explicit value type; `string` is the
/// default and is never stored.
fn split_typed_value(raw: &str) -> (&str, Option<&str>) {
    for t in ["number", "version"] {
        if let Some(v) = raw.strip_prefix(t).and_then(|r| r.strip_prefix(':')) {
            return (v, Some(t));
        }
    }
    if let Some(v) = raw.strip_prefix("string:") {
        return (v, None);
    }
    (raw, None)
}

fn parse_date_expression(cur: &mut Cursor<'_>) -> Result<Element> {
    let op = cur.expect_word()?;
    let mut expr = Element::new("date_expression");
    match op {
        "in" => {
            expr.set_attr("operation", "in_range");
            let mut saw_bound = false;
            while let Some(Nv::Pair {
                name,
                value: Some(value),
                ..
            }) = cur.peek().and_then(parse_nv)
            {
                if name != "start" && name != "end" {
                    break;
                }
                expr.set_attr(&name, &value);
                saw_bound = true;
                cur.advance();
            }
            if !saw_bound {
                return Err(cur.err());
            }
        }
        "gt" | "ge" => {
            expr.set_attr("operation", "gt");
            let date = cur.expect_word()?;
            expr.set_attr("start", date);
        }
        "lt" | "le" => {
            expr.set_attr("operation", "lt");
            let date = cur.expect_word()?;
            expr.set_attr("end", date);
        }
        other => {
            return Err(ShellError::Syntax(format!("date {}", other)));
        }
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_from(tokens: &[&str]) -> Result<Element> {
        let toks: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        let mut cur = Cursor::new(&toks);
        parse_rule(&mut cur)
    }

    #[test]
    fn test_simple_comparison() {
        let rule = rule_from(&["ethmonitor-eth1", "eq", "1"]).unwrap();
        let expr = rule.first_child("expression").unwrap();
        assert_eq!(expr.attr("attribute"), Some("ethmonitor-eth1"));
        assert_eq!(expr.attr("operation"), Some("eq"));
        assert_eq!(expr.attr("value"), Some("1"));
        assert!(rule.attr("boolean-op").is_none());
    }

    #[test]
    fn test_role_date_interval_and_or() {
        let rule = rule_from(&[
            "$role=Started",
            "date",
            "in",
            "start=2009-05-26",
            "end=2010-05-26",
            "or",
            "date",
            "gt",
            "2014-01-01",
        ])
        .unwrap();
        assert_eq!(rule.attr("role"), Some("Started"));
        assert_eq!(rule.attr("boolean-op"), Some("or"));
        let exprs: Vec<&Element> = rule.child_elements().collect();
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[0].attr("operation"), Some("in_range"));
        assert_eq!(exprs[0].attr("start"), Some("2009-05-26"));
        assert_eq!(exprs[0].attr("end"), Some("2010-05-26"));
        assert_eq!(exprs[1].attr("operation"), Some("gt"));
        assert_eq!(exprs[1].attr("start"), Some("2014-01-01"));
    }

    #[test]
    fn test_rule_stops_before_plain_nvpair() {
        let toks: Vec<String> = ["#uname", "eq", "wizbang", "laser=yes"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut cur = Cursor::new(&toks);
        let rule = parse_rule(&mut cur).unwrap();
        assert_eq!(rule.child_elements().count(), 1);
        assert_eq!(cur.peek(), Some("laser=yes"));
    }

    #[test]
    fn test_typed_value() {
        let rule = rule_from(&["state", "gt", "number:2"]).unwrap();
        let expr = rule.first_child("expression").unwrap();
        assert_eq!(expr.attr("value"), Some("2"));
        assert_eq!(expr.attr("type"), Some("number"));
    }

    #[test]
    fn test_mixed_connectives_are_inconsistent() {
        let err = rule_from(&[
            "a", "eq", "1", "and", "b", "eq", "2", "or", "c", "eq", "3",
        ])
        .unwrap_err();
        assert!(matches!(err, ShellError::Semantic(_)));
    }
}
