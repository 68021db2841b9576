//! The Cell arena.
//!
//! A single `Heap<CellId>` arena holding every Cell. SOMA's Cells have no
//! cycle-collection problem to solve (nothing ever frees a Cell mid-run -
//! there is no `del`), so this is a generational arena with no refcounting,
//! guarding only against stale handles surviving a future compaction pass.

use std::rc::Rc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A generational index into the `Heap`: `index` locates the slot, `generation`
/// detects use of a handle from before that slot was last (re)allocated.
/// SOMA never actually recycles slots today (nothing frees a Cell), so
/// `generation` is always `0` in practice, but the field stays load-bearing
/// rather than hollow so a future compaction pass has somewhere to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId {
    index: u32,
    generation: u32,
}

impl CellId {
    #[must_use]
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }
}

/// A Store/Register node: a value plus named children (I3's "tree of named
/// Cells"). `children` uses `Rc<str>` keys, not a freshly allocated `String`
/// per edge, so repeated attribute names across many Cells share storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub value: Value,
    pub children: AHashMap<std::rc::Rc<str>, CellId>,
}

impl Default for Cell {
    fn default() -> Self {
        Self { value: Value::Nil, children: AHashMap::new() }
    }
}

/// Arena of `Cell`s. Append-only: SOMA has no `del`, so every Cell allocated
/// during a run lives until the `Heap` itself is dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Heap {
    slots: Vec<Cell>,
}

impl Heap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, cell: Cell) -> CellId {
        let index = u32::try_from(self.slots.len()).expect("heap exceeds u32::MAX cells");
        self.slots.push(cell);
        CellId::new(index, 0)
    }

    pub fn alloc_default(&mut self) -> CellId {
        self.alloc(Cell::default())
    }

    #[must_use]
    pub fn get(&self, id: CellId) -> &Cell {
        &self.slots[id.index as usize]
    }

    pub fn get_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.slots[id.index as usize]
    }

    /// Looks up (or creates, if `create_missing`) the child named `name` under `parent`.
    pub fn child(&mut self, parent: CellId, name: &str, create_missing: bool) -> Option<CellId> {
        if let Some(&existing) = self.get(parent).children.get(name) {
            return Some(existing);
        }
        if !create_missing {
            return None;
        }
        let child = self.alloc_default();
        self.get_mut(parent).children.insert(Rc::from(name), child);
        Some(child)
    }

    /// Looks up the child named `name` under `parent` without creating it.
    #[must_use]
    pub fn child_ref(&self, parent: CellId, name: &str) -> Option<CellId> {
        self.get(parent).children.get(name).copied()
    }
}
