//! The `python` extension: the FFI bridge named by `spec.md`'s own example
//! path (`use.python.call`), built on `pyo3` as a real, feature-gated
//! dependency (`python-ext`, default off) - see SPEC_FULL §4.6.2.

use crate::error::{ExtensionError, RunResult, VmError};
use crate::extensions::ExtensionRegistrar;
use crate::value::{BlockId, Value};
use crate::vm::Vm;

pub(super) fn register(registrar: &mut ExtensionRegistrar<'_>) {
    registrar.register("call", call).expect("fixed, well-formed suffix");
}

/// No SOMA-side setup needed: `use.python.call` is the whole contract.
pub(super) const SETUP_SOURCE: &str = "";

/// Pops `[argsBlock code]` (top is `code`, a `String` of Python source);
/// `argsBlock` is invoked purely as an AL carrier - whatever values it
/// pushes become the positional arguments visible to the Python snippet as
/// `args[0]`, `args[1]`, ... On success, dual-returns `[Foreign(result),
/// Void]`; on a raised Python exception, `[Void, Foreign(exc)]` (`HostError`
/// per §7 - never a fatal `VmError`, since extension failures surface via
/// the dual-return discipline, not Rust-level propagation).
fn call(vm: &mut Vm) -> RunResult<()> {
    let args = vm.al_mut().pop_n_checked("use.python.call", 2)?;
    let code = match &args[1] {
        Value::String(s) => s.to_string(),
        other => {
            return Err(VmError::Type {
                primitive: "use.python.call",
                expected: "String",
                got: other.kind_name(),
                span: None,
            });
        }
    };
    let Value::Block(block_id) = args[0] else {
        return Err(VmError::Type {
            primitive: "use.python.call",
            expected: "Block",
            got: args[0].kind_name(),
            span: None,
        });
    };
    run(vm, block_id, &code)
}

#[cfg(feature = "python-ext")]
fn run(vm: &mut Vm, args_block: BlockId, code: &str) -> RunResult<()> {
    use std::ffi::CString;

    use crate::extensions::ForeignObj;
    use pyo3::Python;
    use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods, PyList};

    let before = vm.al().len_above_sentinel();
    vm.exec_value(Value::Block(args_block), "use.python.call".to_owned())?;
    let collected = vm.al_mut().pop_n_checked("use.python.call", vm.al().len_above_sentinel() - before)?;

    let outcome: Result<pyo3::Py<pyo3::PyAny>, String> = Python::with_gil(|py| {
        let py_args = PyList::empty(py);
        for value in &collected {
            match value {
                Value::Int(n) => py_args.append(n),
                Value::String(s) => py_args.append(s.as_ref()),
                Value::Bool(b) => py_args.append(b),
                _ => py_args.append(py.None()),
            }
            .map_err(|e| e.to_string())?;
        }
        let globals = PyDict::new(py);
        globals.set_item("args", py_args).map_err(|e| e.to_string())?;
        let code_c = CString::new(code).map_err(|e| e.to_string())?;
        py.run(&code_c, Some(&globals), None).map_err(|e| e.to_string())?;
        let result = globals
            .get_item("result")
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "Python snippet did not bind a `result` name".to_owned())?;
        Ok(result.unbind())
    });

    match outcome {
        Ok(obj) => {
            let id = vm.foreign_mut().alloc(ForeignObj::Python(obj));
            vm.al_mut().push(Value::Foreign(id));
            vm.al_mut().push(Value::Void);
        }
        Err(reason) => {
            let id = vm.foreign_mut().alloc(ForeignObj::HostError(reason));
            vm.al_mut().push(Value::Void);
            vm.al_mut().push(Value::Foreign(id));
        }
    }
    Ok(())
}

/// With `python-ext` off (the default), `use.python` still loads (idempotency
/// is unaffected, per §4.6 step 1), but every `use.python.*` callable raises
/// `ExtensionError::Unavailable` as soon as it is invoked.
#[cfg(not(feature = "python-ext"))]
fn run(_vm: &mut Vm, _args_block: BlockId, _code: &str) -> RunResult<()> {
    Err(VmError::Extension(ExtensionError::Unavailable {
        extension: "python".to_owned(),
        reason: "built without the `python-ext` feature".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::vm::Vm;

    #[test]
    #[cfg(not(feature = "python-ext"))]
    fn call_without_feature_is_extension_unavailable() {
        let mut vm = Vm::new();
        let parsed = parse("(load) >use { } (1) >use.python.call").expect("parse");
        let err = vm.run_instrs(&parsed.instrs).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExtensionError);
    }

    #[test]
    fn python_loads_idempotently_regardless_of_feature() {
        let mut vm = Vm::new();
        let parsed = parse("(python) >use (python) >use").expect("parse");
        vm.run_instrs(&parsed.instrs).expect("run");
    }
}
