// Property-based tests for save/override/restore
//
// Whatever the values, nesting depth, mix of strategies, or failure mode,
// every cell reads its original value once the outermost scope exits.

use super::strategies::{arb_kind, arb_value};
use proptest::prelude::*;
use rebind::{CellKind, Namespace, RebindSet, SymbolCell, Value, Var};

fn declare(ns: &mut Namespace, name: &str, kind: CellKind, init: Value) -> Var {
    match kind {
        CellKind::Dynamic => ns.defdynamic(name, init).unwrap() as Var,
        CellKind::Root => ns.def(name, init).unwrap() as Var,
    }
}

fn nest(cell: &dyn SymbolCell, overrides: &[Value]) {
    let Some((first, rest)) = overrides.split_first() else {
        return;
    };
    RebindSet::new()
        .bind(cell, first.clone())
        .run(|| {
            assert_eq!(&cell.read(), first);
            nest(cell, rest);
            assert_eq!(&cell.read(), first);
        })
        .unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a single override is visible inside and undone after
    #[test]
    fn override_then_restore(kind in arb_kind(), original in arb_value(), new in arb_value()) {
        let mut ns = Namespace::new("prop");
        let var = declare(&mut ns, "x", kind, original.clone());

        let inside = RebindSet::new().bind(&var, new.clone()).run(|| var.read()).unwrap();
        prop_assert_eq!(inside, new);
        prop_assert_eq!(var.read(), original);
        prop_assert_eq!(var.binding_depth(), 0);
    }

    /// Property: arbitrary nesting restores each level's outer value
    #[test]
    fn nested_overrides_unwind(
        kind in arb_kind(),
        original in arb_value(),
        overrides in prop::collection::vec(arb_value(), 0..16),
    ) {
        let mut ns = Namespace::new("prop");
        let var = declare(&mut ns, "x", kind, original.clone());

        nest(&*var, &overrides);
        prop_assert_eq!(var.read(), original);
    }

    /// Property: a set over many cells, with repeats, restores all of them
    #[test]
    fn multi_cell_set_restores_all(
        decls in prop::collection::vec((arb_kind(), arb_value()), 1..6),
        picks in prop::collection::vec((any::<prop::sample::Index>(), arb_value()), 0..12),
        fail in any::<bool>(),
    ) {
        let mut ns = Namespace::new("prop");
        let vars: Vec<Var> = decls
            .iter()
            .enumerate()
            .map(|(i, (kind, init))| declare(&mut ns, &format!("v{}", i), *kind, init.clone()))
            .collect();

        let mut set = RebindSet::new();
        for (index, value) in &picks {
            set.push(&vars[index.index(vars.len())], value.clone());
        }

        let result: Result<(), String> = set.try_run(|| {
            if fail {
                Err("body failed".to_string())
            } else {
                Ok(())
            }
        });
        prop_assert_eq!(result.is_err(), fail);

        for (var, (_, init)) in vars.iter().zip(&decls) {
            prop_assert_eq!(&var.read(), init);
            prop_assert_eq!(var.binding_depth(), 0);
        }
    }

    /// Property: the value seen in the body is the last override per cell
    #[test]
    fn last_override_wins(values in prop::collection::vec(arb_value(), 1..8)) {
        let mut ns = Namespace::new("prop");
        let var = declare(&mut ns, "x", CellKind::Dynamic, Value::NIL);

        let mut set = RebindSet::new();
        for v in &values {
            set.push(&var, v.clone());
        }
        let inside = set.run(|| var.read()).unwrap();
        prop_assert_eq!(Some(&inside), values.last());
        prop_assert_eq!(var.read(), Value::NIL);
    }
}
