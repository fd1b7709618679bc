// Restoration on failure paths: Err results, panics and leaked guards
use crate::common::other_ns;
use rebind::{try_with_rebind, BindingError, RebindSet, ScopeGuard, SymbolCell, Value};
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, PartialEq)]
enum AppError {
    Assert(&'static str),
    Binding(BindingError),
}

impl From<BindingError> for AppError {
    fn from(err: BindingError) -> Self {
        AppError::Binding(err)
    }
}

#[test]
fn test_err_body_restores_and_passes_through() {
    let (_ns, foo, bar) = other_ns();
    let set = RebindSet::new().bind(&foo, 2).bind(&bar, 2);

    let result: Result<(), AppError> = try_with_rebind(&set, || {
        if foo.read() == Value::int(2) {
            return Err(AppError::Assert("Assert failed: (= o/*foo* 1)"));
        }
        Ok(())
    });

    assert_eq!(result, Err(AppError::Assert("Assert failed: (= o/*foo* 1)")));
    assert_eq!(foo.read(), Value::int(1));
    assert_eq!(bar.read(), Value::int(10));
}

#[test]
fn test_ok_body_through_try_run() {
    let (_ns, foo, _bar) = other_ns();
    let set = RebindSet::new().bind(&foo, 2);
    let result: Result<i64, AppError> = set.try_run(|| Ok(foo.read().as_int().unwrap_or(0) * 10));
    assert_eq!(result, Ok(20));
}

#[test]
fn test_panicking_body_restores_before_unwinding_out() {
    let (_ns, foo, bar) = other_ns();
    let set = RebindSet::new().bind(&foo, 2).bind(&bar, 2);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        set.run(|| {
            assert_eq!(foo.read(), Value::int(2));
            panic!("Assert failed: (= o/bar 10)");
        })
    }));

    let payload = result.unwrap_err();
    assert_eq!(
        payload.downcast_ref::<&str>(),
        Some(&"Assert failed: (= o/bar 10)")
    );
    assert_eq!(foo.read(), Value::int(1));
    assert_eq!(bar.read(), Value::int(10));
    assert_eq!(foo.binding_depth(), 0);
    assert_eq!(bar.binding_depth(), 0);
}

#[test]
fn test_panic_in_nested_scope_restores_every_level() {
    let (_ns, foo, _bar) = other_ns();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        RebindSet::new().bind(&foo, 2).run(|| {
            RebindSet::new()
                .bind(&foo, 3)
                .run(|| panic!("inner"))
                .unwrap();
        })
    }));
    assert!(result.is_err());
    assert_eq!(foo.read(), Value::int(1));
    assert_eq!(foo.binding_depth(), 0);
}

#[test]
fn test_leaked_guard_in_body_is_reported() {
    let (_ns, _foo, bar) = other_ns();
    let set = RebindSet::new().bind(&bar, 2);

    let result = set.run(|| {
        std::mem::forget(ScopeGuard::acquire(&bar));
        bar.write(Value::int(3));
    });

    let err = result.unwrap_err();
    assert!(err.is_restoration_error());
    assert!(matches!(err, BindingError::OutOfOrderRelease { top: Some(_), .. }));
    // The orchestrator could not restore through the leaked frame
    assert_eq!(bar.read(), Value::int(3));
}

#[test]
fn test_restoration_error_after_ok_body_is_returned() {
    let (_ns, foo, _bar) = other_ns();
    let set = RebindSet::new().bind(&foo, 2);

    let result: Result<(), AppError> = set.try_run(|| {
        std::mem::forget(ScopeGuard::acquire(&foo));
        Ok(())
    });

    assert!(matches!(
        result,
        Err(AppError::Binding(BindingError::OutOfOrderRelease { .. }))
    ));
}

#[test]
fn test_body_error_with_failed_restoration_fails_loudly() {
    let (_ns, foo, _bar) = other_ns();
    let set = RebindSet::new().bind(&foo, 2);

    // Default policy: the restoration error panics instead of replacing
    // the body error with a binding error
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let result: Result<(), AppError> = set.try_run(|| {
            std::mem::forget(ScopeGuard::acquire(&foo));
            Err(AppError::Assert("Assert failed: (= o/*foo* 1)"))
        });
        result
    }));

    let payload = outcome.unwrap_err();
    let message = payload.downcast_ref::<String>().cloned().unwrap_or_default();
    assert!(message.contains("is still bound"), "{}", message);
}
