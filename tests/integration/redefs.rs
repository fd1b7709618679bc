// Scoped replacement of a shared root
use crate::common::other_ns;
use rebind::{RebindSet, SymbolCell, Value};
use std::thread;

#[test]
fn test_with_redefs() {
    let (ns, _foo, bar) = other_ns();

    let set = ns.rebind_set([("bar", 2)]).unwrap();
    set.run(|| assert_eq!(bar.read(), Value::int(2))).unwrap();

    assert_eq!(bar.read(), Value::int(10));
}

#[test]
fn test_redef_is_visible_to_other_threads() {
    let (_ns, _foo, bar) = other_ns();
    let set = RebindSet::new().bind(&bar, 2);

    let seen = set
        .run(|| {
            let bar = bar.clone();
            thread::spawn(move || bar.read()).join().unwrap()
        })
        .unwrap();

    assert_eq!(seen, Value::int(2));
    assert_eq!(bar.read(), Value::int(10));
}

#[test]
fn test_redef_accepts_any_value_type() {
    let (ns, _foo, bar) = other_ns();
    let set = ns.rebind_set([("bar", Value::string("ten"))]).unwrap();
    set.run(|| assert_eq!(bar.read().as_str(), Some("ten")))
        .unwrap();
    assert_eq!(bar.read(), Value::int(10));
}

#[test]
fn test_rebind_set_mixes_strategies() {
    let (ns, foo, bar) = other_ns();
    let set = ns.rebind_set([("*foo*", 2), ("bar", 2)]).unwrap();
    assert_eq!(set.len(), 2);
    set.run(|| {
        assert_eq!(foo.read(), Value::int(2));
        assert_eq!(bar.read(), Value::int(2));
        assert_eq!(foo.root(), Value::int(1));
    })
    .unwrap();
    assert_eq!(foo.read(), Value::int(1));
    assert_eq!(bar.read(), Value::int(10));
}
