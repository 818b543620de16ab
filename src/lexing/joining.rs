//! Continuation-line joining.
//!
//! Logical lines may span multiple physical lines via a trailing `\`. The
//! marker is stripped and the fragments concatenated in order before
//! tokenizing.

use std::io::BufRead;

use crate::error::{Result, ShellError};

/// Join an in-memory sequence of physical lines into logical lines.
pub fn join_continuations<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    let mut pending = String::new();
    for line in lines {
        let stripped = line.as_ref().trim();
        if let Some(fragment) = stripped.strip_suffix('\\') {
            pending.push_str(fragment);
        } else {
            pending.push_str(stripped);
            out.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        out.push(pending);
    }
    out
}

/// Iterator of logical lines over a blocking reader.
///
/// Reading the next line is the only place the engine blocks on input; end
/// of input ends the iterator. Read failures surface as external errors.
pub struct LogicalLines<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LogicalLines<R> {
    pub fn new(reader: R) -> Self {
        LogicalLines { reader }
    }
}

impl<R: BufRead> Iterator for LogicalLines<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut logical = String::new();
        let mut saw_any = false;
        loop {
            let mut physical = String::new();
            match self.reader.read_line(&mut physical) {
                Ok(0) => {
                    if saw_any {
                        return Some(Ok(logical));
                    }
                    return None;
                }
                Ok(_) => {
                    saw_any = true;
                    let stripped = physical.trim();
                    if let Some(fragment) = stripped.strip_suffix('\\') {
                        logical.push_str(fragment);
                    } else {
                        logical.push_str(stripped);
                        return Some(Ok(logical));
                    }
                }
                Err(e) => return Some(Err(ShellError::External(e.to_string()))),
            }
        }
    }
}
