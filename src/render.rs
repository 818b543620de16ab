//! Serializer: document model to canonical CLI text.
//!
//! The renderer is the inverse of the grammar parser: it walks an element
//! tree in stored order and emits the canonical text, so that
//! `render(parse(text)) == text` for canonical input, modulo schema-driven
//! name normalization, legacy-ACL canonicalization, and the strippable
//! presentation markers of the color mode.

pub mod cliformat;
pub mod modes;

pub use cliformat::render_object;
pub use modes::{strip_markers, OutputFormat, RenderOpts};
