//! `print`'s output sink, a host-swappable trait (`PrintWriter` +
//! `StdPrint`/`CollectStringPrint`/`NoPrint`). No redirect stack and no
//! `Exception`-returning methods - no host write ever fails in a way SOMA
//! source can observe, so the trait is infallible.

use std::cell::RefCell;
use std::rc::Rc;

/// Receives the canonical text `print` writes, one call per invocation
/// (the newline is part of `line`, not a separate call - `print` always
/// writes a complete line in one primitive call).
pub trait PrintWriter {
    fn print_line(&mut self, line: &str);
}

/// Default writer: stdout, line-buffered by the OS.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn print_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects every line into an in-memory buffer. Used by the test-runner's
/// `EXPECT_OUTPUT` comparison and by library consumers embedding `soma`
/// without a real terminal. Backed by `Rc<RefCell<_>>` rather than a bare
/// `Vec` so a caller can keep a [`handle`](Self::handle) to read the
/// captured lines after handing the writer itself off to a `Vm` (which
/// takes ownership of its `Box<dyn PrintWriter>`).
#[derive(Debug, Default)]
pub struct CollectStringPrint {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// A shared handle to the captured lines, readable after this writer has
    /// been moved into a `Vm`.
    #[must_use]
    pub fn handle(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.lines)
    }
}

impl PrintWriter for CollectStringPrint {
    fn print_line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}

/// Discards all output. Useful for fuzzing or benchmarking the VM without
/// I/O overhead.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn print_line(&mut self, _line: &str) {}
}
