//! Batch session loop.
//!
//! Reads logical lines (continuations joined) from any buffered reader and
//! dispatches them one at a time. A failing line is reported and sets the
//! eventual exit status to 1, but processing continues; `quit` stops the
//! loop with whatever status has accumulated.

use std::io::BufRead;

use crate::error::ShellError;
use crate::lexing::LogicalLines;
use crate::shell::dispatch::{Outcome, Session};

/// Run every logical line from `reader` through the session. Returns the
/// process exit status: 0 if every line succeeded, 1 otherwise.
pub fn run_lines<R: BufRead>(session: &mut Session<'_>, reader: R) -> i32 {
    let mut status = 0;
    for line in LogicalLines::new(reader) {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                report(&e);
                status = 1;
                continue;
            }
        };
        match session.dispatch_line(&line) {
            Ok(Outcome::Continue(Some(text))) => println!("{}", text),
            Ok(Outcome::Continue(None)) => {}
            Ok(Outcome::Quit) => break,
            Err(e) => {
                report(&e);
                status = 1;
            }
        }
    }
    status
}

fn report(e: &ShellError) {
    eprintln!("ERROR: {}", e);
}
