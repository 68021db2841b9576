//! The six concrete end-to-end scenarios from spec.md §8, run against a
//! fresh VM with the stdlib loaded, plus smoke tests for the pure-SOMA
//! standard library (`stdlib.soma`) itself.
//!
//! The `.soma` directive file format (`) TEST:` / `) EXPECT_AL:` /
//! `) EXPECT_OUTPUT:`) that drives batches of these from disk is a
//! `soma-cli` concern (see its `test_runner` module) rather than something
//! the library crate parses; this file exercises the same scenarios
//! directly through the public `Vm` API instead of round-tripping through
//! that directive syntax.

use soma::{CollectStringPrint, Value, Vm};

fn fresh_vm_with_stdlib() -> Vm {
    let mut vm = Vm::new();
    vm.load_stdlib().expect("stdlib loads");
    vm
}

fn run_capturing_output(src: &str) -> (Vm, Vec<String>) {
    let writer = CollectStringPrint::new();
    let lines = writer.handle();
    let mut vm = Vm::new().with_output(Box::new(writer));
    vm.load_stdlib().expect("stdlib loads");
    vm.exec_source(src).expect("run");
    let captured = lines.borrow().clone();
    (vm, captured)
}

#[test]
fn scenario_one_addition_and_print() {
    let (vm, output) = run_capturing_output("2 3 >+ >print");
    assert_eq!(output, vec!["5".to_owned()]);
    assert_eq!(vm.al().len_above_sentinel(), 0);
}

#[test]
fn scenario_two_concat_and_print() {
    let (vm, output) = run_capturing_output("(hello) (world) >concat >print");
    assert_eq!(output, vec!["helloworld".to_owned()]);
    assert_eq!(vm.al().len_above_sentinel(), 0);
}

#[test]
fn scenario_three_choose_exec_and_print() {
    let (_, output) = run_capturing_output("{ (no) } { (yes) } True >choose >^ >print");
    assert_eq!(output, vec!["yes".to_owned()]);
}

#[test]
fn scenario_four_chain_terminates_immediately_on_nil() {
    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("{ Nil } >chain").expect("run");
    assert_eq!(vm.al().len_above_sentinel(), 0);
}

#[test]
fn scenario_five_double_via_register_and_print() {
    let (_, output) =
        run_capturing_output("{ !_.x _.x _.x >+ } !double 21 >double >print");
    assert_eq!(output, vec!["42".to_owned()]);
}

#[test]
fn scenario_six_lazy_cell_creation_on_nested_setter_path() {
    let (_, output) = run_capturing_output("42 !a.b.c a.b.c >print");
    assert_eq!(output, vec!["42".to_owned()]);
}

#[test]
fn stdlib_stack_shuffling() {
    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("1 >dup").expect("run");
    let slice = vm.al().as_slice();
    assert!(matches!(slice[slice.len() - 2], Value::Int(1)));
    assert!(matches!(slice[slice.len() - 1], Value::Int(1)));

    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("1 2 >swap").expect("run");
    let slice = vm.al().as_slice();
    assert!(matches!(slice[slice.len() - 2], Value::Int(2)));
    assert!(matches!(slice[slice.len() - 1], Value::Int(1)));
}

#[test]
fn stdlib_logic() {
    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("True >not").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(false)));

    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("True False >and").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(false)));

    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("False True >or").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(true)));
}

#[test]
fn stdlib_derived_comparisons() {
    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("5 3 >gt").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(true)));

    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("3 3 >ge").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(true)));

    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("2 3 >le").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(true)));

    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("2 3 >ne").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Bool(true)));
}

#[test]
fn stdlib_if_runs_then_only_when_true() {
    let (_, output) = run_capturing_output("True { (ran) >print } >if");
    assert_eq!(output, vec!["ran".to_owned()]);

    let (_, output) = run_capturing_output("False { (ran) >print } >if");
    assert!(output.is_empty());
}

#[test]
fn stdlib_while_loops_until_the_condition_goes_false() {
    let mut vm = fresh_vm_with_stdlib();
    let src = "\
        0 !n \
        { n 5 >< } { n 1 >+ !n } >while \
        n";
    vm.exec_source(src).expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Int(5)));
}

#[test]
fn stdlib_times_runs_the_body_exactly_n_times() {
    let mut vm = fresh_vm_with_stdlib();
    vm.exec_source("0 !count 4 { count 1 >+ !count } >times count").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::Int(4)));
}
