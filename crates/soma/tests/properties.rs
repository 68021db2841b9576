//! The testable properties spec.md §8 states as laws rather than single
//! examples: AL sentinel, register freshness, setter/getter round-trip,
//! CellRef identity, `choose` selection, `chain` termination, idempotent
//! `use`, and the dual-return discipline. Each test below is chosen to
//! generalize past one fixed input, not just repeat the scenario examples
//! (those live in `soma_files.rs`).

use soma::{Value, Vm};

#[test]
fn al_sentinel_survives_every_terminating_program() {
    for src in [
        "1 2 >+",
        "(a) (b) >concat",
        "{ 2 } { 1 } True >choose",
        "{ Nil } >chain",
        "Void >isVoid",
    ] {
        let mut vm = Vm::new();
        vm.exec_source(src).expect("run");
        assert!(matches!(vm.al().as_slice()[0], Value::Void), "sentinel lost for {src:?}");
    }
}

#[test]
fn register_freshness_holds_across_many_successive_invocations() {
    let mut vm = Vm::new();
    vm.exec_source("{ !_.a _.a. } !probe").expect("run");
    let mut seen = Vec::new();
    for _ in 0..5 {
        vm.exec_source("1 >probe").expect("run");
        let Value::CellRef(id) = vm.al().as_slice().last().unwrap() else { panic!("expected CellRef") };
        seen.push(*id);
    }
    for i in 0..seen.len() {
        for j in (i + 1)..seen.len() {
            assert_ne!(seen[i], seen[j], "invocations {i} and {j} shared a Register");
        }
    }
}

#[test]
fn setter_getter_round_trip_leaves_the_al_otherwise_unchanged() {
    let cases: [(&str, fn(&Value) -> bool); 4] = [
        ("42", |v| matches!(v, Value::Int(42))),
        ("(hi)", |v| matches!(v, Value::String(s) if s.as_ref() == "hi")),
        ("True", |v| matches!(v, Value::Bool(true))),
        ("Nil", |v| matches!(v, Value::Nil)),
    ];
    for (literal, matcher) in cases {
        let mut vm = Vm::new();
        let src = format!("{literal} !roundTripped roundTripped");
        vm.exec_source(&src).expect("run");
        assert_eq!(vm.al().len_above_sentinel(), 1, "AL grew for {literal}");
        assert!(matcher(vm.al().as_slice().last().unwrap()), "value mismatch for {literal}");
    }
}

#[test]
fn two_evaluations_of_a_cell_ref_getter_denote_the_same_cell() {
    let mut vm = Vm::new();
    vm.exec_source("42 !shared shared. shared.").expect("run");
    let slice = vm.al().as_slice();
    let (Value::CellRef(a), Value::CellRef(b)) = (&slice[slice.len() - 2], &slice[slice.len() - 1]) else {
        panic!("expected two CellRefs");
    };
    assert_eq!(a, b);
}

#[test]
fn choose_always_picks_the_matching_branch_and_drops_the_other() {
    // Push order is `[falseBlock trueBlock cond]`, cond on top (spec.md §4.4).
    let mut vm = Vm::new();
    vm.exec_source("(no) (yes) True >choose").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::String(s) if s.as_ref() == "yes"));
    assert_eq!(vm.al().len_above_sentinel(), 1);

    let mut vm = Vm::new();
    vm.exec_source("(no) (yes) False >choose").expect("run");
    assert!(matches!(vm.al().as_slice().last().unwrap(), Value::String(s) if s.as_ref() == "no"));
    assert_eq!(vm.al().len_above_sentinel(), 1);
}

#[test]
fn chain_continues_while_blocks_keep_arriving_and_stops_on_nil() {
    // Three hops through self-produced Blocks before the chain bottoms out.
    let src = "\
        { n 1 >- !n { Nil } { step } n 0 >ge >choose } !step \
        3 !n \
        step >chain";
    let mut vm = Vm::new();
    vm.load_stdlib().expect("stdlib");
    vm.exec_source(src).expect("run");
    assert_eq!(vm.al().len_above_sentinel(), 0);
}

#[test]
fn dual_return_callables_always_leave_exactly_one_void_on_top() {
    for src in ["(123) >toInt", "(nope) >toInt"] {
        let mut vm = Vm::new();
        vm.exec_source(src).expect("run");
        let slice = vm.al().as_slice();
        let last_two = &slice[slice.len() - 2..];
        let void_count = last_two.iter().filter(|v| matches!(v, Value::Void)).count();
        assert_eq!(void_count, 1, "dual-return violated for {src:?}");
    }
}
