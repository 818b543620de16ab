//! Lexer for shell input lines.
//!
//! A logical input line (after continuation-line joining) is split into
//! shell-like word tokens honoring quoting and escaping. The splitter runs a
//! logos lexer over the line; each matched word is then unquoted. Bracket and
//! brace grouping (`[ A B ]`, `to { ... }`) is whitespace-delimited, so the
//! group markers arrive at the parser as ordinary one-character tokens.
//!
//! The pipeline is:
//!     1. Physical lines ending in `\` are joined into one logical line.
//!        See [joining].
//!     2. The logical line is tokenized with the logos lexer and unquoted.
//!        See [splitter] and [tokens].
//!
//! `detokenize` reconstructs a canonical line from a word list, re-quoting
//! words that need it. It is the round-trip aid for token-level tests, not
//! the object serializer (that lives in [crate::render]).

pub mod joining;
pub mod splitter;
pub mod tokens;

pub use joining::{join_continuations, LogicalLines};
pub use splitter::{detokenize, requote, split_line};
pub use tokens::RawToken;
