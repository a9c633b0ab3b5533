use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rlox::lox::{Lox, RunOutcome};

/// An output sink the test can read back after handing it to the interpreter.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("print output is UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session wired to a readable output buffer.
pub fn session() -> (Lox, SharedBuf) {
    let out = SharedBuf::default();
    (Lox::with_output(Box::new(out.clone())), out)
}

/// Run `source` in a fresh session, returning printed output and the outcome.
pub fn run(source: &str) -> (String, RunOutcome) {
    let (mut lox, out) = session();
    let outcome = lox.run(source);
    (out.contents(), outcome)
}

/// Run a program that must succeed and return what it printed.
#[allow(dead_code)]
pub fn output_of(source: &str) -> String {
    let (output, outcome) = run(source);
    assert!(
        matches!(outcome, RunOutcome::Success),
        "program failed: {:?}",
        outcome
    );
    output
}

/// Rendered diagnostics of a run, in order.
#[allow(dead_code)]
pub fn messages(outcome: &RunOutcome) -> Vec<String> {
    outcome.errors().iter().map(|e| e.to_string()).collect()
}
