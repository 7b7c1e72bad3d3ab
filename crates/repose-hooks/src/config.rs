//! # Runtime configuration
//!
//! Hook runtimes are per thread, and so is their configuration. Install one
//! with [`configure`], or override it for a region with [`with_config`]:
//!
//! ```rust
//! use repose_hooks::{FlushPolicy, HookConfig, config, with_config};
//!
//! let lenient = HookConfig {
//!     flush_policy: FlushPolicy::ContinueOnError,
//!     ..HookConfig::default()
//! };
//!
//! with_config(lenient, || {
//!     assert_eq!(config().flush_policy, FlushPolicy::ContinueOnError);
//! });
//! assert_eq!(config().flush_policy, FlushPolicy::AbortOnError);
//! ```
//!
//! Flushes read the configuration when they run, so wrap the whole `tick`
//! (not just the state writes) when overriding the flush policy.

use std::cell::Cell;

/// What a flush does when a replayed hook fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Stop at the first failure. Contexts left in the batch are dropped
    /// without being replayed.
    #[default]
    AbortOnError,
    /// Replay every armed context, log each failure, and report the first.
    ContinueOnError,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookConfig {
    pub flush_policy: FlushPolicy,
    /// Warn when an invocation makes a different number of state calls than
    /// the previous one did.
    pub slot_diagnostics: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            flush_policy: FlushPolicy::AbortOnError,
            slot_diagnostics: true,
        }
    }
}

thread_local! {
    static CONFIG: Cell<HookConfig> = Cell::new(HookConfig::default());
}

/// Installs `config` for the current thread and returns the previous one.
pub fn configure(config: HookConfig) -> HookConfig {
    CONFIG.with(|c| c.replace(config))
}

pub fn config() -> HookConfig {
    CONFIG.with(|c| c.get())
}

pub fn with_config<R>(config: HookConfig, f: impl FnOnce() -> R) -> R {
    struct Restore(HookConfig);

    impl Drop for Restore {
        fn drop(&mut self) {
            configure(self.0);
        }
    }

    let _restore = Restore(configure(config));
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_config_restores_previous_value() {
        let quiet = HookConfig {
            slot_diagnostics: false,
            ..HookConfig::default()
        };

        let inner = with_config(quiet, config);
        assert!(!inner.slot_diagnostics);
        assert_eq!(config(), HookConfig::default());
    }

    #[test]
    fn configure_returns_previous() {
        let lenient = HookConfig {
            flush_policy: FlushPolicy::ContinueOnError,
            ..HookConfig::default()
        };
        let previous = configure(lenient);
        assert_eq!(previous, HookConfig::default());
        assert_eq!(configure(previous), lenient);
    }
}
