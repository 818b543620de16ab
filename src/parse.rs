//! CLI grammar parser.
//!
//! Recursive-descent parsing of a post-dispatch token slice into a document
//! object. Each object kind has its own sub-grammar in its own submodule;
//! they share the token cursor, the nv-pair forms, and the keyword-section
//! machinery in [common]. Errors are explicit `Result` values carrying the
//! offending remainder; a failed parse never reaches the document.

pub mod acl;
pub mod alerts;
pub mod common;
pub mod constraints;
pub mod fencing;
pub mod resources;
pub mod rules;

use crate::error::{Result, ShellError};
use crate::model::Element;
use crate::schema::Schema;

use common::Cursor;

/// Parse one object definition. The slice starts with the object-kind
/// keyword, exactly as the dispatcher hands it over.
pub fn parse_object(tokens: &[String], schema: &dyn Schema) -> Result<Element> {
    let mut cur = Cursor::new(tokens);
    let kind = cur.next().ok_or_else(|| ShellError::Syntax(String::new()))?;
    let el = match kind {
        "primitive" => resources::parse_primitive(&mut cur, schema, "primitive")?,
        "rsc_template" => resources::parse_primitive(&mut cur, schema, "template")?,
        "group" => resources::parse_group(&mut cur)?,
        "clone" => resources::parse_clone(&mut cur, "clone")?,
        "ms" | "master" => resources::parse_clone(&mut cur, "ms")?,
        "colocation" => constraints::parse_colocation(&mut cur)?,
        "order" => constraints::parse_order(&mut cur)?,
        "location" => constraints::parse_location(&mut cur)?,
        "fencing_topology" => fencing::parse_fencing_topology(&mut cur)?,
        "role" => acl::parse_role(&mut cur)?,
        "acl_target" => acl::parse_acl_target(&mut cur)?,
        "alert" => alerts::parse_alert(&mut cur)?,
        _ => return Err(ShellError::syntax_at(cur.all_from(0))),
    };
    if !cur.done() {
        return Err(cur.err());
    }
    Ok(el)
}
