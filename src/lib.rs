//! # cibsh
//!
//! An interactive and batch command shell for a cluster-resource-manager
//! configuration base. Input lines are dispatched through a static level
//! tree, object definitions are parsed from a crm-style configuration
//! language into an attributed element tree, and the tree serializes back
//! to canonical text that round-trips through the parser.
//!
//! The pipeline, in order:
//!
//! 1. [lexing] — continuation joining and shell-like word splitting.
//! 2. [shell] — level tree, command dispatcher, session loop.
//! 3. [parse] — recursive-descent CLI grammar per object kind.
//! 4. [model] — the element tree, identifier registry, document factory.
//! 5. [render] — serializer and render modes.
//!
//! [schema] supplies the external parameter-name oracle and [config] the
//! per-session preferences; [error] holds the error taxonomy everything
//! returns.

pub mod config;
pub mod error;
pub mod lexing;
pub mod model;
pub mod parse;
pub mod render;
pub mod schema;
pub mod shell;

pub use error::{Result, ShellError};
