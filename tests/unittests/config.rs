use rebind::config::{self, RebindConfig, ReleaseFailurePolicy};

#[test]
fn test_default_policy_is_panic() {
    assert_eq!(
        RebindConfig::default().release_failure,
        ReleaseFailurePolicy::Panic
    );
}

#[test]
fn test_install_after_first_use_is_rejected() {
    let active = config::current();
    assert_eq!(config::install(RebindConfig::DEFAULT), Err(active));
}
