//! Instruction dispatch, block invocation, and the uniform `exec_value` path
//! every executable kind (Block, Builtin, and in time an extension
//! callable) goes through. See SPEC_FULL §4.3.

use crate::error::{RunResult, VmError};
use crate::parser::Instr;
use crate::value::{BlockId, Value};

use super::Vm;

/// Ensures a block invocation's Register is popped and `depth` decremented
/// on every exit path - normal completion or an error short-circuiting out
/// of `run_instrs` via `?` - per §5's "Register release on any exit path."
/// Holds a raw pointer rather than a borrow so `invoke_block` can keep using
/// `self` normally (`self.block_body`, `self.run_instrs`) while the guard is
/// alive - an ordinary borrow-scoped `&mut Vm` can't be held across the
/// recursive `run_instrs` call this guard wraps, and nothing else would
/// otherwise run this cleanup on the error path.
struct RegisterGuard {
    vm: *mut Vm,
}

impl RegisterGuard {
    fn new(vm: &mut Vm) -> Self {
        Self { vm: std::ptr::from_mut(vm) }
    }
}

impl Drop for RegisterGuard {
    fn drop(&mut self) {
        // SAFETY: `vm` is reborrowed from a `&mut Vm` that outlives this
        // guard - the guard is created and dropped within a single
        // `invoke_block` call, which holds that `&mut Vm` for its whole body
        // - and no other alias to the same `Vm` is live while this runs.
        let vm = unsafe { &mut *self.vm };
        vm.registers.pop();
        vm.depth -= 1;
    }
}

impl Vm {
    pub fn run_instrs(&mut self, instrs: &[Instr]) -> RunResult<()> {
        for instr in instrs {
            self.run_one(instr)?;
        }
        Ok(())
    }

    fn run_one(&mut self, instr: &Instr) -> RunResult<()> {
        match instr {
            Instr::PushLiteral(v) => {
                self.al.push(v.clone());
                Ok(())
            }
            Instr::PushBlock(id) => {
                self.al.push(Value::Block(*id));
                Ok(())
            }
            Instr::PushPathValue(path) => {
                let cell = self
                    .resolve_path(path, false)
                    .ok_or_else(|| VmError::UndefinedPath { path: path.to_string(), span: None })?;
                self.al.push(self.heap.get(cell).value.clone());
                Ok(())
            }
            Instr::PushCellRef(path) => {
                let cell = self
                    .resolve_path(path, false)
                    .ok_or_else(|| VmError::UndefinedPath { path: path.to_string(), span: None })?;
                self.al.push(Value::CellRef(cell));
                Ok(())
            }
            Instr::Set(path) => {
                let value = self.al.pop_checked("!")?;
                let cell = self.resolve_path(path, true).expect("create_missing=true never returns None");
                self.heap.get_mut(cell).value = value;
                Ok(())
            }
            Instr::SetRegisterRoot => self.set_register_root(),
            Instr::Exec(path) => {
                let cell = self
                    .resolve_path(path, false)
                    .ok_or_else(|| VmError::UndefinedPath { path: path.to_string(), span: None })?;
                let value = self.heap.get(cell).value.clone();
                self.exec_value(value, path.to_string())
            }
            Instr::ExecTop => self.exec_top(),
        }
    }

    /// `!_.` (§4.5): pops a CellRef and installs it as this invocation's
    /// Register root. The lexer only ever emits this instruction for source
    /// text that was exactly `!_.`, so there is no path-shape to validate
    /// here - only the popped value's kind.
    fn set_register_root(&mut self) -> RunResult<()> {
        match self.al.pop_checked("!_.")? {
            Value::CellRef(id) => {
                *self.registers.last_mut().expect("register stack is never empty") = id;
                Ok(())
            }
            other => {
                Err(VmError::Type { primitive: "!_.", expected: "CellRef", got: other.kind_name(), span: None })
            }
        }
    }

    /// Pops a Block from the AL and invokes it once. Shared by the bare `^`
    /// instruction and the `^` Store entry's native implementation.
    pub(crate) fn exec_top(&mut self) -> RunResult<()> {
        match self.al.pop_checked("^")? {
            Value::Block(id) => self.invoke_block(id),
            other => Err(VmError::Type { primitive: "^", expected: "Block", got: other.kind_name(), span: None }),
        }
    }

    /// The one dispatch path every executable value goes through (§4.3,
    /// §9's "Uniform dispatch" design note): a Block gets a fresh Register,
    /// a Builtin calls straight through, anything else is `NotExecutable`.
    pub(crate) fn exec_value(&mut self, value: Value, path_for_diagnostic: String) -> RunResult<()> {
        match value {
            Value::Block(id) => self.invoke_block(id),
            Value::Builtin(id) => {
                let f = self.builtins[id.0 as usize];
                f(self)
            }
            other => {
                Err(VmError::NotExecutable { path: path_for_diagnostic, value_kind: other.kind_name(), span: None })
            }
        }
    }

    fn invoke_block(&mut self, id: BlockId) -> RunResult<()> {
        if self.depth >= self.max_depth {
            return Err(VmError::RecursionLimit { limit: self.max_depth });
        }
        let fresh = self.heap.alloc_default();
        self.registers.push(fresh);
        self.depth += 1;
        let guard = RegisterGuard::new(self);
        let body = self.block_body(id);
        let result = self.run_instrs(&body);
        drop(guard);
        result
    }
}
