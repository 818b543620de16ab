//! The command shell: level tree, dispatcher, session loop.
//!
//! Input lines are tokenized and walked against a static tree of levels and
//! commands. A token naming a sublevel descends; a token naming a command
//! stops the walk, and the rest of the line (command token included) is the
//! command's raw argument slice. The navigation stack is marked before each
//! line and rolled back on any failure, so an erroring line never leaves the
//! session somewhere it did not ask to be.

pub mod dispatch;
pub mod levels;
pub mod session;

pub use dispatch::{NullNotifier, Outcome, Session, SettleNotifier};
pub use levels::{Arity, Command, CommandAction, LevelTree};
pub use session::run_lines;
