//! Path resolution: §4.3's "let `p = s0.s1…sn`. If `s0 == "_"`, the root is
//! the current Register; otherwise the root is the Store."

use crate::heap::CellId;
use crate::lexer::Path;

use super::Vm;

impl Vm {
    /// The Cell currently addressable as bare `_` - the top of the Register stack.
    #[must_use]
    pub(crate) fn register_root(&self) -> CellId {
        *self.registers.last().expect("at least one Register is always active")
    }

    /// Resolves `path` to a Cell. When `create_missing` is false (getters,
    /// executors, CellRef creation), an absent Cell along the way yields
    /// `None`, which callers turn into `UndefinedPath`. When true (setters),
    /// every missing Cell on the way is allocated.
    pub(crate) fn resolve_path(&mut self, path: &Path, create_missing: bool) -> Option<CellId> {
        let mut segments = path.segments.iter();
        let first = segments.next().expect("lexer never produces an empty path");
        let mut current = if first == "_" {
            self.register_root()
        } else {
            let root = self.store;
            self.heap.child(root, first, create_missing)?
        };
        for segment in segments {
            current = self.heap.child(current, segment, create_missing)?;
        }
        Some(current)
    }

    /// Creates (if absent) every Cell along a dotted Store path and binds its
    /// value - the mechanism extension registration and core built-in
    /// installation both use to populate the Store.
    pub(crate) fn bind_store_path(&mut self, dotted: &str, value: crate::value::Value) -> CellId {
        let mut current = self.store;
        for segment in dotted.split('.') {
            current = self.heap.child(current, segment, true).expect("create_missing=true never returns None");
        }
        self.heap.get_mut(current).value = value;
        current
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Path;
    use crate::value::Value;
    use crate::vm::Vm;

    fn path(segs: &[&str]) -> Path {
        Path::new(segs.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn store_rooted_getter_misses_without_create() {
        let mut vm = Vm::new();
        assert!(vm.resolve_path(&path(&["a", "b"]), false).is_none());
    }

    #[test]
    fn store_rooted_setter_creates_intermediate_cells() {
        let mut vm = Vm::new();
        let id = vm.resolve_path(&path(&["a", "b", "c"]), true).expect("created");
        vm.heap.get_mut(id).value = Value::Int(42);
        let again = vm.resolve_path(&path(&["a", "b", "c"]), false).expect("now present");
        assert_eq!(id, again);
    }

    #[test]
    fn register_rooted_path_resolves_against_register_top() {
        let mut vm = Vm::new();
        let id = vm.resolve_path(&path(&["_", "x"]), true).expect("created");
        assert_ne!(id, vm.store);
    }

    #[test]
    fn bare_register_path_is_the_register_root_itself() {
        let mut vm = Vm::new();
        let id = vm.resolve_path(&path(&["_"]), false).expect("register root always exists");
        assert_eq!(id, vm.register_root());
    }
}
