//! The side table backing `Value::Foreign` (spec.md §3: "opaque handle to an
//! object from an extension... that cannot be losslessly converted").
//!
//! Kept separate from the Cell `Heap` because Foreign payloads are not
//! Cell-shaped (no `children`, no path addressing) and, under the
//! `python-ext` feature, hold a `pyo3::PyObject` that must never be treated
//! as plain SOMA data.

use crate::value::ForeignId;

/// What a `ForeignId` actually points at.
pub enum ForeignObj {
    /// A SOMA-describable host failure (an OS error message, an
    /// extension-unavailable reason) - used by `load`'s `read_file` and by
    /// `python-ext`-disabled stubs.
    HostError(String),
    /// A live Python object returned from `use.python.call`, never unwrapped
    /// into a SOMA `Value` automatically (round-tripping losslessly is
    /// explicitly out of scope - spec.md §3's definition of `Foreign`).
    #[cfg(feature = "python-ext")]
    Python(pyo3::PyObject),
}

/// Append-only arena of `ForeignObj`s, mirroring `Heap`'s own "nothing ever
/// frees a slot mid-run" shape (SOMA has no `del`).
#[derive(Default)]
pub struct ForeignTable {
    slots: Vec<ForeignObj>,
}

impl ForeignTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, obj: ForeignObj) -> ForeignId {
        let id = ForeignId(u32::try_from(self.slots.len()).expect("more Foreign objects than u32::MAX"));
        self.slots.push(obj);
        id
    }

    #[must_use]
    pub fn get(&self, id: ForeignId) -> &ForeignObj {
        &self.slots[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_assigns_distinct_ids() {
        let mut table = ForeignTable::new();
        let a = table.alloc(ForeignObj::HostError("first".to_owned()));
        let b = table.alloc(ForeignObj::HostError("second".to_owned()));
        assert_ne!(a, b);
        assert!(matches!(table.get(a), ForeignObj::HostError(s) if s == "first"));
    }
}
