//! VM state snapshotting (SPEC_FULL §6.4): save and restore a running
//! session's full Store/Register/AL state.
//!
//! `BlockTable`/`Instr` are deliberately *not* serialized: `Instr` holds
//! `Rc`s that do not survive a process boundary usefully, and re-lexing and
//! re-parsing SOMA source is cheap, so a snapshot instead stores the
//! original source text and replays it against a fresh `Vm` on restore.
//! SOMA source has no way to trigger or observe this - it exists purely for
//! an embedding host (the `soma-cli --test` runner uses it to get a
//! guaranteed-fresh `Vm` per test block without re-running `Vm::new`'s
//! allocator setup from scratch each time).

use serde::{Deserialize, Serialize};

use crate::al::Al;
use crate::error::RunResult;
use crate::heap::{CellId, Heap};

use super::Vm;

/// A serializable capture of everything about a `Vm` that is actually data
/// (as opposed to `builtins`/`output`/`input`, which are process-local and
/// reconstructed fresh on restore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// The source text that produced this VM's state, re-run against a
    /// fresh `Vm` on `restore`.
    pub source: String,
    heap: Heap,
    al: Al,
    store: CellId,
    registers: Vec<CellId>,
    loaded_extensions: Vec<String>,
}

impl Vm {
    /// Captures this VM's data state alongside the `source` that produced
    /// it. `source` is the caller's responsibility to track (the `Vm` itself
    /// never retains the text it last executed, since `exec_source` may be
    /// called many times over a VM's life).
    #[must_use]
    pub fn snapshot(&self, source: &str) -> Snapshot {
        Snapshot {
            source: source.to_owned(),
            heap: self.heap.clone(),
            al: self.al.clone(),
            store: self.store,
            registers: self.registers.clone(),
            loaded_extensions: self.extensions.loaded.iter().cloned().collect(),
        }
    }

    /// Rebuilds a `Vm` from a `Snapshot`: constructs a fresh `Vm` (so
    /// built-ins are installed the normal way), replays `snapshot.source`
    /// to repopulate the block table under those same built-ins, then
    /// overlays the captured data state (heap, AL, registers, loaded
    /// extensions) on top.
    pub fn restore(snapshot: &Snapshot) -> RunResult<Self> {
        let mut vm = Self::new();
        vm.exec_source(&snapshot.source)?;
        vm.heap = snapshot.heap.clone();
        vm.al = snapshot.al.clone();
        vm.store = snapshot.store;
        vm.registers = snapshot.registers.clone();
        vm.extensions.loaded = snapshot.loaded_extensions.iter().cloned().collect();
        Ok(vm)
    }
}
