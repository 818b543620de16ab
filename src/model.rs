//! Canonical document model.
//!
//! The configuration is an attributed element tree: tag = object kind,
//! attributes = identifier/score/etc., ordered children = nested structures
//! (attribute sets, operations, resource sets, rule expressions). The same
//! tree is the interchange format with the external configuration store,
//! encoded through serde. See [element].
//!
//! Identity is managed by [idmgmt]: every object has exactly one identifier,
//! assigned by the author or generated deterministically from the parent
//! identifier and the structural role, and never silently duplicated.
//!
//! [factory] owns the document: objects are created by the CLI grammar
//! parser or by deserializing an existing tree, mutated only through
//! explicit edit commands, and destroyed by explicit delete (which reports
//! the dangling references it leaves behind).

pub mod element;
pub mod factory;
pub mod idmgmt;
pub mod resolver;

pub use element::{Element, Node};
pub use factory::CibFactory;
pub use idmgmt::IdRegistry;
