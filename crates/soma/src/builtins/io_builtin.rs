//! `print`, `readLine` (spec.md §4.4), backed by the host-swappable
//! `PrintWriter` trait (`io.rs`).

use std::rc::Rc;

use crate::error::RunResult;
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn install(vm: &mut Vm) {
    vm.install_builtin("print", print);
    vm.install_builtin("readLine", read_line);
}

fn print(vm: &mut Vm) -> RunResult<()> {
    let v = vm.al_mut().pop_checked("print")?;
    let text = v.to_canonical_string();
    vm.writer_mut().print_line(&text);
    Ok(())
}

fn read_line(vm: &mut Vm) -> RunResult<()> {
    let line = vm.read_line().unwrap_or_default();
    vm.al_mut().push(Value::String(Rc::from(line)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::io::CollectStringPrint;
    use crate::parser::parse;
    use crate::vm::Vm;

    #[test]
    fn scenario_one_prints_five() {
        let writer = CollectStringPrint::new();
        let captured = writer.handle();
        let mut vm = Vm::new().with_output(Box::new(writer));
        let parsed = parse("2 3 >+ >print").expect("parse");
        vm.run_instrs(&parsed.instrs).expect("run");
        assert_eq!(vm.al().len_above_sentinel(), 0);
        assert_eq!(*captured.borrow(), vec!["5".to_owned()]);
    }

    #[test]
    fn read_line_pushes_stdin_text() {
        let mut vm = Vm::new().with_input(Box::new(std::io::Cursor::new(b"hello\n".to_vec())));
        let parsed = parse(">readLine").expect("parse");
        vm.run_instrs(&parsed.instrs).expect("run");
        let top = vm.al().as_slice().last().expect("non-empty");
        assert!(matches!(top, crate::value::Value::String(s) if s.as_ref() == "hello"));
    }
}
