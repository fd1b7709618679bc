// Restoration order observed through watches
use crate::common::{other_ns, record_changes};
use rebind::binding::{Change, WatchEvent};
use rebind::{RebindSet, ScopeGuard, SymbolCell, Value};
use std::sync::{Arc, Mutex};

#[test]
fn test_restores_in_reverse_order() {
    let (_ns, foo, bar) = other_ns();
    let log = record_changes(&[&*foo, &*bar]);

    RebindSet::new()
        .bind(&foo, 2)
        .bind(&bar, 2)
        .run(|| ())
        .unwrap();

    assert_eq!(log.restores(), vec!["bar", "*foo*"]);
    assert_eq!(
        log.events(),
        vec![
            "write *foo* 1->2",
            "write bar 10->2",
            "restore bar 2->10",
            "restore *foo* 2->1",
        ]
    );
}

#[test]
fn test_reverse_order_on_panic() {
    let (_ns, foo, bar) = other_ns();
    let log = record_changes(&[&*foo, &*bar]);

    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        RebindSet::new()
            .bind(&bar, 2)
            .bind(&foo, 2)
            .run(|| panic!("boom"))
    }));

    assert_eq!(log.restores(), vec!["*foo*", "bar"]);
}

#[test]
fn test_duplicate_symbol_restores_inner_then_outer() {
    let (_ns, _foo, bar) = other_ns();
    let log = record_changes(&[&*bar]);

    RebindSet::new()
        .bind(&bar, 2)
        .bind(&bar, 3)
        .run(|| ())
        .unwrap();

    let restores: Vec<String> = log
        .events()
        .into_iter()
        .filter(|e| e.starts_with("restore"))
        .collect();
    assert_eq!(restores, vec!["restore bar 3->2", "restore bar 2->10"]);
}

#[test]
fn test_watch_sees_restored_value_when_called() {
    let (_ns, foo, _bar) = other_ns();
    let observed = Arc::new(Mutex::new(Vec::new()));
    {
        let observed = Arc::clone(&observed);
        let cell = Arc::clone(&foo);
        foo.add_watch(
            "reader",
            Arc::new(move |event: &WatchEvent<'_>| {
                if event.change == Change::Restore {
                    observed.lock().unwrap().push(cell.read());
                }
            }),
        );
    }

    RebindSet::new().bind(&foo, 2).run(|| ()).unwrap();
    assert_eq!(*observed.lock().unwrap(), vec![Value::int(1)]);

    assert!(foo.remove_watch("reader"));
    assert!(!foo.remove_watch("reader"));
}

#[test]
fn test_manual_guards_follow_lifo() {
    let (_ns, foo, bar) = other_ns();
    let log = record_changes(&[&*foo, &*bar]);
    {
        let _a = ScopeGuard::acquire(&foo);
        foo.write(Value::int(2));
        let _b = ScopeGuard::acquire(&bar);
        bar.write(Value::int(2));
        // Locals drop in reverse declaration order
    }
    assert_eq!(log.restores(), vec!["bar", "*foo*"]);
}
