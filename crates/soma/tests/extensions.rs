//! End-to-end coverage of the extension loader (spec.md §4.6): the `load`
//! extension's two native primitives plus its SOMA-defined search policy,
//! idempotent loading, unknown-extension reporting, and the restricted
//! `use.<name>.` registration prefix.

use soma::{ErrorKind, Value, Vm};

#[test]
fn loading_an_unknown_extension_is_an_extension_error() {
    let mut vm = Vm::new();
    let err = vm.exec_source("(not-a-real-extension) >use").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExtensionError);
}

#[test]
fn use_is_idempotent() {
    // "(n) >use (n) >use has the same effect as a single (n) >use" (§8).
    let mut once = Vm::new();
    once.exec_source("(load) >use").expect("run");

    let mut twice = Vm::new();
    twice.exec_source("(load) >use (load) >use").expect("run");

    assert_eq!(once.al().len_above_sentinel(), twice.al().len_above_sentinel());
}

#[test]
fn loaded_callables_land_under_the_use_prefix() {
    let mut vm = Vm::new();
    vm.exec_source("(load) >use use.load.exists").expect("run");
    let top = vm.al().as_slice().last().expect("non-empty");
    assert!(matches!(top, Value::Builtin(_)));
}

#[test]
fn load_exists_and_read_file_round_trip_through_a_real_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixture.soma");
    std::fs::write(&path, "payload").expect("write fixture");

    let mut vm = Vm::new();
    let src = format!("(load) >use ({}) >use.load.exists", path.display());
    vm.exec_source(&src).expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(true)));

    let mut vm = Vm::new();
    let src = format!("(load) >use ({}) >use.load.read_file", path.display());
    vm.exec_source(&src).expect("run");
    let slice = vm.al().as_slice();
    assert!(matches!(&slice[slice.len() - 2], Value::String(s) if s.as_ref() == "payload"));
    assert!(matches!(slice[slice.len() - 1], Value::Void));
}

#[test]
fn read_file_failure_dual_returns_a_foreign_host_error() {
    let mut vm = Vm::new();
    vm.exec_source("(load) >use (/no/such/path.soma) >use.load.read_file").expect("run");
    let slice = vm.al().as_slice();
    assert!(matches!(slice[slice.len() - 2], Value::Void));
    assert!(matches!(slice[slice.len() - 1], Value::Foreign(_)));
}

#[test]
fn load_module_search_policy_falls_back_to_the_lib_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("lib")).expect("mkdir lib");
    std::fs::write(dir.path().join("lib/mathutils.soma"), "99 !fromLib").expect("write fixture");

    let mut vm = Vm::new();
    vm.exec_source("(load) >use").expect("run");
    let original = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(dir.path()).expect("chdir into fixture dir");
    let result = vm.exec_source("(mathutils) >use.load.module");
    std::env::set_current_dir(original).expect("restore cwd");
    result.expect("run");

    let slice = vm.al().as_slice();
    assert!(matches!(&slice[slice.len() - 2], Value::String(s) if s.contains("fromLib")));
    assert!(matches!(slice[slice.len() - 1], Value::Void));
}

#[test]
#[cfg(not(feature = "python-ext"))]
fn python_call_without_the_feature_is_extension_unavailable() {
    let mut vm = Vm::new();
    let err = vm.exec_source("(python) >use { } (1) >use.python.call").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExtensionError);
}

#[test]
fn python_loads_idempotently_regardless_of_the_feature_flag() {
    let mut vm = Vm::new();
    vm.exec_source("(python) >use (python) >use").expect("run");
}
