//! The Accumulator List: the one operand stack every primitive and Block shares.

use crate::error::{RunResult, VmError};
use crate::value::Value;

/// `Vec<Value>` seeded with one `Value::Void` sentinel at index 0 (I2) that
/// is never popped past - `pop_checked` treats "only the sentinel remains"
/// the same as "empty" and raises `AlUnderflow` rather than returning it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Al {
    values: Vec<Value>,
}

impl Default for Al {
    fn default() -> Self {
        Self { values: vec![Value::Void] }
    }
}

impl Al {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pops one value above the sentinel, raising `AlUnderflow { primitive }`
    /// if only the sentinel remains.
    pub fn pop_checked(&mut self, primitive: &'static str) -> RunResult<Value> {
        if self.values.len() <= 1 {
            return Err(VmError::AlUnderflow { primitive, span: None });
        }
        Ok(self.values.pop().expect("length checked above"))
    }

    /// Pops `n` values above the sentinel in push order (first popped is
    /// last, so the returned `Vec` reads left-to-right as pushed).
    pub fn pop_n_checked(&mut self, primitive: &'static str, n: usize) -> RunResult<Vec<Value>> {
        if self.values.len() <= n {
            return Err(VmError::AlUnderflow { primitive, span: None });
        }
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.values.pop().expect("length checked above"));
        }
        out.reverse();
        Ok(out)
    }

    #[must_use]
    pub fn peek(&self) -> &Value {
        self.values.last().expect("sentinel never popped")
    }

    #[must_use]
    pub fn len_above_sentinel(&self) -> usize {
        self.values.len() - 1
    }

    /// Full contents including the sentinel, oldest first - used by the
    /// test-runner's `EXPECT_AL` comparison and by snapshotting.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Rebuilds an `Al` from a previously captured [`as_slice`](Self::as_slice)
    /// (expected to start with the `Void` sentinel) - the restore half of
    /// `vm::snapshot`.
    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }
}
