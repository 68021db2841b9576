//! The virtual machine: AL, Store, Register stack, block table, built-ins
//! and extensions, unified behind one instruction-dispatch loop.
//!
//! One `Vm` struct owns every piece of mutable interpreter state, one
//! dispatch function handles each instruction kind, and - per SPEC_FULL
//! §4.3 - exactly one code path (`exec_value`) is how a Block, a Builtin, or
//! an extension callable reaches execution.

mod dispatch;
mod path;
mod snapshot;

pub use snapshot::Snapshot;

use std::io::BufRead;
use std::rc::Rc;

use ahash::AHashSet;

use crate::al::Al;
use crate::error::{RunResult, VmError};
use crate::heap::{CellId, Heap};
use crate::io::{PrintWriter, StdPrint};
use crate::lexer::Lexer;
use crate::parser::{BlockTable, Instr, Parser, shift_block_ids};
use crate::value::{BuiltinId, Value};

/// Default cap on simultaneously active Register frames (SPEC_FULL §4.3),
/// overridable by an embedding host via [`Vm::with_max_depth`] - never by
/// SOMA source itself.
pub const MAX_BLOCK_DEPTH: usize = 4096;

/// A natively implemented callable. Receives the `Vm` so it can pop/push
/// the AL, read or rebind Registers, or (for `use`) trigger extension
/// loading - just another function taking the interpreter, dispatched the
/// same way as any Block.
pub type BuiltinFn = fn(&mut Vm) -> RunResult<()>;

/// Tracks which extensions have already been loaded, satisfying §4.6 step 1's
/// idempotency requirement.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    pub(crate) loaded: AHashSet<String>,
}

pub struct Vm {
    pub(crate) al: Al,
    pub(crate) heap: Heap,
    pub(crate) store: CellId,
    pub(crate) registers: Vec<CellId>,
    pub(crate) blocks: BlockTable,
    pub(crate) builtins: Vec<BuiltinFn>,
    pub(crate) extensions: ExtensionRegistry,
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
    pub(crate) output: Box<dyn PrintWriter>,
    pub(crate) input: Box<dyn BufRead>,
    pub(crate) foreign: crate::extensions::ForeignTable,
}

impl Vm {
    /// A fresh VM: empty Store, one top-level Register, core built-ins
    /// installed, no stdlib and no extensions loaded. `stdout` is `StdPrint`,
    /// `stdin` is the process's real standard input.
    #[must_use]
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let store = heap.alloc_default();
        let register_root = heap.alloc_default();
        let mut vm = Self {
            al: Al::new(),
            heap,
            store,
            registers: vec![register_root],
            blocks: BlockTable::default(),
            builtins: Vec::new(),
            extensions: ExtensionRegistry::default(),
            depth: 0,
            max_depth: MAX_BLOCK_DEPTH,
            output: Box::new(StdPrint),
            input: Box::new(std::io::BufReader::new(std::io::stdin())),
            foreign: crate::extensions::ForeignTable::new(),
        };
        crate::builtins::install_all(&mut vm);
        vm
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: Box<dyn PrintWriter>) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: Box<dyn BufRead>) -> Self {
        self.input = input;
        self
    }

    #[must_use]
    pub fn al(&self) -> &Al {
        &self.al
    }

    pub(crate) fn al_mut(&mut self) -> &mut Al {
        &mut self.al
    }

    /// Registers a native function, returning the id under which it is now
    /// addressable as `Value::Builtin`.
    pub(crate) fn register_builtin_fn(&mut self, f: BuiltinFn) -> BuiltinId {
        let id = BuiltinId(u32::try_from(self.builtins.len()).expect("more builtins than u32::MAX"));
        self.builtins.push(f);
        id
    }

    /// Installs a core built-in under a single Store-root path segment
    /// (e.g. `+`, `print`, `choose`).
    pub(crate) fn install_builtin(&mut self, name: &str, f: BuiltinFn) {
        let id = self.register_builtin_fn(f);
        self.bind_store_path(name, Value::Builtin(id));
    }

    /// Lexes and parses `source`, merges its blocks into this VM's running
    /// `BlockTable`, and runs the resulting instruction stream. Used
    /// uniformly for stdlib loading, extension setup source, and the user
    /// program itself - per SPEC_FULL §6.4, there is no separate "compile
    /// once, run many times" step; re-lexing is cheap enough not to need one.
    pub fn exec_source(&mut self, source: &str) -> RunResult<()> {
        let tokens = Lexer::new(source).tokenize().map_err(VmError::Lex)?;
        let parsed = Parser::new(&tokens).parse_program().map_err(VmError::Parse)?;
        let offset = self.blocks.merge(parsed.blocks);
        let mut instrs = parsed.instrs;
        shift_block_ids(&mut instrs, offset);
        self.run_instrs(&instrs)
    }

    /// Ensures `name` is loaded, per §4.6. A no-op if already loaded.
    pub fn load_extension(&mut self, name: &str) -> RunResult<()> {
        if self.extensions.loaded.contains(name) {
            return Ok(());
        }
        crate::extensions::load(self, name)?;
        self.extensions.loaded.insert(name.to_owned());
        Ok(())
    }

    /// Loads the embedded pure-SOMA standard library (`stdlib.soma`) into
    /// this VM's Store, unless already loaded. Idempotent in the same spirit
    /// as extension loading, though the stdlib is not itself an extension
    /// (SPEC_FULL §6.3) - it is plain SOMA source run once at startup.
    pub fn load_stdlib(&mut self) -> RunResult<()> {
        self.exec_source(crate::STDLIB_SOURCE)
    }

    /// Reads one line from the configured input, without the trailing newline.
    pub(crate) fn read_line(&mut self) -> std::io::Result<String> {
        let mut buf = String::new();
        self.input.read_line(&mut buf)?;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(buf)
    }

    pub(crate) fn writer_mut(&mut self) -> &mut dyn PrintWriter {
        self.output.as_mut()
    }

    pub(crate) fn foreign_mut(&mut self) -> &mut crate::extensions::ForeignTable {
        &mut self.foreign
    }

    pub(crate) fn block_body(&self, id: crate::value::BlockId) -> Rc<[Instr]> {
        Rc::clone(self.blocks.get(id))
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
