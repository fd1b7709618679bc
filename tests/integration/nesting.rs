use crate::common::other_ns;
use rebind::{RebindSet, SymbolCell, Value};

#[test]
fn test_inner_restore_exposes_outer_override() {
    let (_ns, foo, bar) = other_ns();
    let cells: [&dyn SymbolCell; 2] = [&*foo, &*bar];

    for cell in cells {
        let original = cell.read();
        RebindSet::new()
            .bind(cell, 2)
            .run(|| {
                RebindSet::new()
                    .bind(cell, 3)
                    .run(|| assert_eq!(cell.read(), Value::int(3)))
                    .unwrap();
                assert_eq!(cell.read(), Value::int(2));
            })
            .unwrap();
        assert_eq!(cell.read(), original);
    }
}

#[test]
fn test_deep_nesting() {
    let (_ns, foo, _bar) = other_ns();

    fn nest(cell: &dyn SymbolCell, depth: i64) {
        if depth == 0 {
            return;
        }
        RebindSet::new()
            .bind(cell, depth)
            .run(|| {
                assert_eq!(cell.read(), Value::int(depth));
                nest(cell, depth - 1);
                assert_eq!(cell.read(), Value::int(depth));
            })
            .unwrap();
    }

    nest(&*foo, 64);
    assert_eq!(foo.read(), Value::int(1));
    assert_eq!(foo.binding_depth(), 0);
}

#[test]
fn test_same_symbol_twice_in_one_set() {
    let (_ns, foo, bar) = other_ns();
    let set = RebindSet::new()
        .bind(&foo, 2)
        .bind(&foo, 3)
        .bind(&bar, 2)
        .bind(&bar, 3);

    set.run(|| {
        assert_eq!(foo.read(), Value::int(3));
        assert_eq!(bar.read(), Value::int(3));
        assert_eq!(foo.binding_depth(), 2);
        assert_eq!(bar.binding_depth(), 2);
    })
    .unwrap();

    assert_eq!(foo.read(), Value::int(1));
    assert_eq!(bar.read(), Value::int(10));
}

#[test]
fn test_empty_set_is_a_plain_call() {
    let (_ns, foo, _bar) = other_ns();
    let out = RebindSet::new()
        .run(|| {
            assert_eq!(foo.binding_depth(), 0);
            "done"
        })
        .unwrap();
    assert_eq!(out, "done");
}

#[test]
fn test_set_is_reusable() {
    let (_ns, foo, _bar) = other_ns();
    let set = RebindSet::new().bind(&foo, 2);
    for _ in 0..3 {
        set.run(|| assert_eq!(foo.read(), Value::int(2))).unwrap();
        assert_eq!(foo.read(), Value::int(1));
    }
}
