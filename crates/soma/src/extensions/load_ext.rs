//! The `load` extension: filesystem access (spec.md §1 names its
//! *search policy* - "filesystem-search logic of the `load` extension" - as
//! out of scope, written in SOMA rather than Rust). The native half here is
//! deliberately thin: two primitives, `read_file` and `exists`; everything
//! about *where* to look for a named module lives in `SETUP_SOURCE` below.

use std::fs;

use crate::error::RunResult;
use crate::extensions::ExtensionRegistrar;
use crate::extensions::ForeignObj;
use crate::value::Value;
use crate::vm::Vm;

pub(super) fn register(registrar: &mut ExtensionRegistrar<'_>) {
    registrar.register("read_file", read_file).expect("fixed, well-formed suffix");
    registrar.register("exists", exists).expect("fixed, well-formed suffix");
}

fn as_path(vm: &mut Vm, primitive: &'static str) -> RunResult<String> {
    match vm.al_mut().pop_checked(primitive)? {
        Value::String(s) => Ok(s.to_string()),
        other => Err(crate::error::VmError::Type {
            primitive,
            expected: "String",
            got: other.kind_name(),
            span: None,
        }),
    }
}

/// Dual-return (spec.md §7): `[contents, Void]` on success, `[Void,
/// Foreign(HostError)]` on failure - a real OS error, unlike `toInt`'s
/// SOMA-native parse failure, so it goes through `Value::Foreign` rather
/// than a bare `String`.
fn read_file(vm: &mut Vm) -> RunResult<()> {
    let path = as_path(vm, "use.load.read_file")?;
    match fs::read_to_string(&path) {
        Ok(contents) => {
            vm.al_mut().push(Value::String(contents.into()));
            vm.al_mut().push(Value::Void);
        }
        Err(e) => {
            let id = vm.foreign_mut().alloc(ForeignObj::HostError(format!("{path}: {e}")));
            vm.al_mut().push(Value::Void);
            vm.al_mut().push(Value::Foreign(id));
        }
    }
    Ok(())
}

fn exists(vm: &mut Vm) -> RunResult<()> {
    let path = as_path(vm, "use.load.exists")?;
    vm.al_mut().push(Value::Bool(std::path::Path::new(&path).exists()));
    Ok(())
}

/// Defines `use.load.module`: given a bare module name (e.g. `(mathutils)`),
/// tries `<name>.soma` then `lib/<name>.soma` and dual-returns the loaded
/// source text, or `[Void, Void]` if neither candidate exists. This is the
/// policy spec.md §1 calls out of scope for the Rust side - it is ordinary
/// SOMA source, built only on the two native primitives above plus `choose`.
///
/// `choose` pops `[falseBlock trueBlock cond]` with `cond` on top (spec.md
/// §4.4), matching `stdlib.soma`'s own `and`/`or`/`if`/`while`/`times`; both
/// candidate blocks below reach this invocation's Register the same way
/// those combinators do - a `_.` CellRef pushed just ahead of them, popped
/// back by the chosen block's leading `!_.` (spec.md §4.5).
pub(super) const SETUP_SOURCE: &str = r"
{
    !_.name
    _.name (.soma) >concat !_.candidate
    _.
    {
        !_.
        (lib/) _.name >concat (.soma) >concat !_.candidate
        _.
        { !_. Void Void }
        { !_. _.candidate >use.load.read_file }
        _.candidate >use.load.exists
        >choose >^
    }
    { !_. _.candidate >use.load.read_file }
    _.candidate >use.load.exists
    >choose >^
} !use.load.module
";
