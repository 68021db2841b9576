//! `concat`, `toString`, `toInt` (spec.md §4.4).

use std::rc::Rc;

use crate::error::{RunResult, VmError};
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn install(vm: &mut Vm) {
    vm.install_builtin("concat", concat);
    vm.install_builtin("toString", to_string_builtin);
    vm.install_builtin("toInt", to_int);
}

fn as_string(primitive: &'static str, v: &Value) -> RunResult<Rc<str>> {
    match v {
        Value::String(s) => Ok(Rc::clone(s)),
        other => Err(VmError::Type { primitive, expected: "String", got: other.kind_name(), span: None }),
    }
}

fn concat(vm: &mut Vm) -> RunResult<()> {
    let args = vm.al_mut().pop_n_checked("concat", 2)?;
    let a = as_string("concat", &args[0])?;
    let b = as_string("concat", &args[1])?;
    let mut joined = String::with_capacity(a.len() + b.len());
    joined.push_str(&a);
    joined.push_str(&b);
    vm.al_mut().push(Value::String(Rc::from(joined)));
    Ok(())
}

fn to_string_builtin(vm: &mut Vm) -> RunResult<()> {
    let v = vm.al_mut().pop_checked("toString")?;
    vm.al_mut().push(Value::String(Rc::from(v.to_canonical_string())));
    Ok(())
}

/// Dual-return (spec.md §7): on successful parse pushes `[Int, Void]`; on
/// failure pushes `[Void, String(reason)]` - a SOMA-native failure has no
/// host object to report, so it uses a `String` rather than `Foreign`,
/// which `use.load`/`use.python`'s host-raised failures use instead.
fn to_int(vm: &mut Vm) -> RunResult<()> {
    let v = vm.al_mut().pop_checked("toInt")?;
    let s = as_string("toInt", &v)?;
    match s.parse::<i64>() {
        Ok(n) => {
            vm.al_mut().push(Value::Int(n));
            vm.al_mut().push(Value::Void);
        }
        Err(_) => {
            vm.al_mut().push(Value::Void);
            vm.al_mut().push(Value::String(Rc::from(format!("cannot parse '{s}' as Int"))));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::value::Value;
    use crate::vm::Vm;

    fn run(src: &str) -> Vm {
        let mut vm = Vm::new();
        let parsed = parse(src).expect("parse");
        vm.run_instrs(&parsed.instrs).expect("run");
        vm
    }

    #[test]
    fn scenario_two_concat() {
        let vm = run("(hello) (world) >concat");
        let top = vm.al().as_slice().last().expect("non-empty");
        assert!(matches!(top, Value::String(s) if s.as_ref() == "helloworld"));
    }

    #[test]
    fn to_string_renders_canonical_forms() {
        let vm = run("42 >toString True >toString Void >toString Nil >toString");
        let slice = vm.al().as_slice();
        let texts: Vec<_> = slice[1..].iter().map(|v| match v {
            Value::String(s) => s.to_string(),
            _ => panic!("expected String"),
        }).collect();
        assert_eq!(texts, vec!["42", "True", "Void", "Nil"]);
    }

    #[test]
    fn to_int_success_is_dual_return_with_void_second() {
        let vm = run("(123) >toInt");
        let slice = vm.al().as_slice();
        assert!(matches!(slice[slice.len() - 2], Value::Int(123)));
        assert!(matches!(slice[slice.len() - 1], Value::Void));
    }

    #[test]
    fn to_int_failure_is_dual_return_with_void_first() {
        let vm = run("(not-a-number) >toInt");
        let slice = vm.al().as_slice();
        assert!(matches!(slice[slice.len() - 2], Value::Void));
        assert!(matches!(slice[slice.len() - 1], Value::String(_)));
    }
}
