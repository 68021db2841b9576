//! `choose`, `chain`, and the `^` Store entry (spec.md §4.4, §9 "Uniform
//! dispatch"): control-flow primitives that are ordinary rebindable Store
//! Cells, not VM special cases. Rebinding `!chain` to an instrumented
//! version works precisely because `exec_value` never distinguishes these
//! from any other Builtin.

use crate::error::{RunResult, VmError};
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn install(vm: &mut Vm) {
    vm.install_builtin("choose", choose);
    vm.install_builtin("chain", chain);
    vm.install_builtin("^", exec_top);
}

/// Pops `[falseBlock trueBlock cond]` (top is `cond`) and pushes back
/// whichever block `cond` selects, without executing it.
fn choose(vm: &mut Vm) -> RunResult<()> {
    let args = vm.al_mut().pop_n_checked("choose", 3)?;
    let [false_block, true_block, cond] = [args[0].clone(), args[1].clone(), args[2].clone()];
    let selected = match cond {
        Value::Bool(true) => true_block,
        Value::Bool(false) => false_block,
        other => {
            return Err(VmError::Type { primitive: "choose", expected: "Bool", got: other.kind_name(), span: None });
        }
    };
    vm.al_mut().push(selected);
    Ok(())
}

/// Pops a Block, executes it, then loops: if the block left a Block on top,
/// `chain` pops and executes that too; if it left `Nil`, `chain` consumes it
/// and stops. The sole looping construct - recursion and iteration are both
/// built on this.
fn chain(vm: &mut Vm) -> RunResult<()> {
    loop {
        let current = vm.al_mut().pop_checked("chain")?;
        match current {
            Value::Block(id) => vm.exec_value(Value::Block(id), "chain".to_owned())?,
            other => {
                return Err(VmError::Type { primitive: "chain", expected: "Block", got: other.kind_name(), span: None });
            }
        }
        match vm.al_mut().peek() {
            Value::Nil => {
                vm.al_mut().pop_checked("chain").expect("peeked Nil is present");
                return Ok(());
            }
            Value::Block(_) => continue,
            other => {
                return Err(VmError::Type {
                    primitive: "chain",
                    expected: "Block or Nil",
                    got: other.kind_name(),
                    span: None,
                });
            }
        }
    }
}

fn exec_top(vm: &mut Vm) -> RunResult<()> {
    vm.exec_top()
}
