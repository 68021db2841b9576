//! `+ - * / % <`: binary, pop two, push result (spec.md §4.4).
//!
//! Push order is source order: `a b >+` computes `a + b`. `pop_n_checked`
//! returns values oldest-first, so `args[0]` is the operand pushed first
//! (`a`) and `args[1]` is the one pushed last, i.e. on top (`b`).

use crate::error::{RunResult, VmError};
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn install(vm: &mut Vm) {
    vm.install_builtin("+", add);
    vm.install_builtin("-", sub);
    vm.install_builtin("*", mul);
    vm.install_builtin("/", div);
    vm.install_builtin("%", rem);
    vm.install_builtin("<", lt);
    vm.install_builtin("=", eq);
}

fn as_int(primitive: &'static str, v: &Value) -> RunResult<i64> {
    match v {
        Value::Int(n) => Ok(*n),
        other => Err(VmError::Type { primitive, expected: "Int", got: other.kind_name(), span: None }),
    }
}

fn pop_two_ints(vm: &mut Vm, primitive: &'static str) -> RunResult<(i64, i64)> {
    let args = vm.al_mut().pop_n_checked(primitive, 2)?;
    let a = as_int(primitive, &args[0])?;
    let b = as_int(primitive, &args[1])?;
    Ok((a, b))
}

/// Fixed 64-bit `Int` with explicit wraparound on overflow (SPEC_FULL §3.1) -
/// no `ArithmeticError` is raised for `+`/`-`/`*` overflow, only for division
/// or modulo by zero.
fn add(vm: &mut Vm) -> RunResult<()> {
    let (a, b) = pop_two_ints(vm, "+")?;
    vm.al_mut().push(Value::Int(a.wrapping_add(b)));
    Ok(())
}

fn sub(vm: &mut Vm) -> RunResult<()> {
    let (a, b) = pop_two_ints(vm, "-")?;
    vm.al_mut().push(Value::Int(a.wrapping_sub(b)));
    Ok(())
}

fn mul(vm: &mut Vm) -> RunResult<()> {
    let (a, b) = pop_two_ints(vm, "*")?;
    vm.al_mut().push(Value::Int(a.wrapping_mul(b)));
    Ok(())
}

fn div(vm: &mut Vm) -> RunResult<()> {
    let (a, b) = pop_two_ints(vm, "/")?;
    if b == 0 {
        return Err(VmError::Type { primitive: "/", expected: "nonzero divisor", got: "0", span: None });
    }
    vm.al_mut().push(Value::Int(a.wrapping_div(b)));
    Ok(())
}

fn rem(vm: &mut Vm) -> RunResult<()> {
    let (a, b) = pop_two_ints(vm, "%")?;
    if b == 0 {
        return Err(VmError::Type { primitive: "%", expected: "nonzero divisor", got: "0", span: None });
    }
    vm.al_mut().push(Value::Int(a.wrapping_rem(b)));
    Ok(())
}

fn lt(vm: &mut Vm) -> RunResult<()> {
    let (a, b) = pop_two_ints(vm, "<")?;
    vm.al_mut().push(Value::Bool(a < b));
    Ok(())
}

/// Kind-and-value equality over any two `Value`s (resolved Open Question,
/// SPEC_FULL §3.2) - unlike the other comparisons this is not Int-only,
/// since the standard library derives `ne`/`ge`/`le`/`gt` from `<` and this.
fn eq(vm: &mut Vm) -> RunResult<()> {
    let args = vm.al_mut().pop_n_checked("=", 2)?;
    vm.al_mut().push(Value::Bool(args[0].soma_eq(&args[1])));
    Ok(())
}
