//! Process-wide configuration for the binding layer.
//!
//! The only tunable is what a `ScopeGuard` does when its automatic release
//! in `Drop` is rejected. Explicit releases always return the error.

use std::env;
use std::fmt;
use std::sync::OnceLock;

/// Environment variable read by `RebindConfig::from_env`
pub const RELEASE_FAILURE_ENV: &str = "REBIND_RELEASE_FAILURE";

/// Reaction to a rejected release inside `Drop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseFailurePolicy {
    /// Panic with the release error (unless already unwinding)
    Panic,
    /// Log the release error and continue
    Log,
}

impl ReleaseFailurePolicy {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "panic" | "abort" | "strict" => Some(Self::Panic),
            "log" | "warn" => Some(Self::Log),
            _ => None,
        }
    }
}

impl fmt::Display for ReleaseFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReleaseFailurePolicy::Panic => "panic",
            ReleaseFailurePolicy::Log => "log",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebindConfig {
    pub release_failure: ReleaseFailurePolicy,
}

impl RebindConfig {
    pub const DEFAULT: Self = Self {
        release_failure: ReleaseFailurePolicy::Panic,
    };

    #[must_use]
    pub fn from_env() -> Self {
        let policy = env::var_os(RELEASE_FAILURE_ENV).map(|v| v.to_string_lossy().to_string());
        apply_env_overrides(Self::DEFAULT, policy.as_deref())
    }
}

impl Default for RebindConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn apply_env_overrides(base: RebindConfig, policy: Option<&str>) -> RebindConfig {
    let release_failure = match policy {
        Some(spec) => ReleaseFailurePolicy::parse(spec).unwrap_or_else(|| {
            tracing::warn!(
                target: "rebind::config",
                value = spec,
                fallback = %base.release_failure,
                "unrecognised {}",
                RELEASE_FAILURE_ENV
            );
            base.release_failure
        }),
        None => base.release_failure,
    };
    RebindConfig { release_failure }
}

static CONFIG: OnceLock<RebindConfig> = OnceLock::new();

/// Install the process-wide configuration
///
/// Fails with the already active configuration if one was installed or
/// lazily loaded before.
pub fn install(config: RebindConfig) -> Result<(), RebindConfig> {
    CONFIG.set(config).map_err(|_| current())
}

/// The active configuration, loaded from the environment on first use
pub fn current() -> RebindConfig {
    *CONFIG.get_or_init(RebindConfig::from_env)
}
