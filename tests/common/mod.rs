//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::rc::Rc;

use treelox::interpreter::Interpreter;
use treelox::pipeline::{self, RunError};

/// A `Write` sink the test can still read after handing it to the interpreter.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
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

/// Run `source` with empty stdin, returning what it printed and how it ended.
pub fn run(source: &str) -> (String, Result<(), RunError>) {
    run_with_input(source, "")
}

/// Run `source` with `input` served to `input.read()` / `input.readNum()`.
pub fn run_with_input(source: &str, input: &str) -> (String, Result<(), RunError>) {
    let out = SharedBuf::default();
    let mut interpreter = Interpreter::with_io(
        Box::new(out.clone()),
        Box::new(Cursor::new(input.as_bytes().to_vec())),
    );

    let result = pipeline::run_source(&mut interpreter, source);

    (out.contents(), result)
}

/// Rendered diagnostics of a failed run, one per line.
pub fn messages(result: &Result<(), RunError>) -> Vec<String> {
    match result {
        Ok(()) => Vec::new(),
        Err(e) => e.diagnostics().iter().map(|d| d.to_string()).collect(),
    }
}
