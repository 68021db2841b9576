//! `use`: thin wrapper over [`Vm::load_extension`] (spec.md §4.4, §4.6).

use crate::error::{RunResult, VmError};
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn install(vm: &mut Vm) {
    vm.install_builtin("use", use_);
}

fn use_(vm: &mut Vm) -> RunResult<()> {
    let v = vm.al_mut().pop_checked("use")?;
    let name = match v {
        Value::String(s) => s,
        other => {
            return Err(VmError::Type { primitive: "use", expected: "String", got: other.kind_name(), span: None });
        }
    };
    vm.load_extension(&name)
}
