//! Dart-facing bridge API via flutter_rust_bridge.
//!
//! # Responsibility
//! - Expose install/cleanup to Flutter hosts that hold a runtime address.
//! - Expose logging bootstrap and smoke-check calls.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Lifecycle results are plain booleans; details go to the log.

use runtime_bridge_core::{
    cleanup_registered, core_version as core_version_inner, init_logging as init_logging_inner,
    install_registered, logging_status, ping as ping_inner,
};

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Bridge crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes bridge logging once per process.
///
/// Input semantics:
/// - `level`: `trace|debug|info|warn|error`, case-insensitive. Empty uses
///   `RUNTIME_BRIDGE_LOG_LEVEL` or the build-mode default.
/// - `log_dir`: absolute directory for rolling log files.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Active log directory, or `None` when logging was never initialized.
#[flutter_rust_bridge::frb(sync)]
pub fn log_dir() -> Option<String> {
    logging_status().map(|(_, dir)| dir.display().to_string())
}

/// Installs the registered extension into the runtime at `runtime_address`.
///
/// # FFI contract
/// - Sync call; must run on the runtime's owning thread.
/// - Returns `false` for a null address, a missing extension, or an
///   extension failure.
#[flutter_rust_bridge::frb(sync)]
pub fn install_runtime(runtime_address: i64) -> bool {
    install_registered(runtime_address)
}

/// Cleans up the registered extension from the runtime at `runtime_address`.
///
/// # FFI contract
/// - Same thread and failure rules as [`install_runtime`].
/// - Safe to call without a prior successful install.
#[flutter_rust_bridge::frb(sync)]
pub fn cleanup_runtime(runtime_address: i64) -> bool {
    cleanup_registered(runtime_address)
}

#[cfg(test)]
mod tests {
    use super::{cleanup_runtime, core_version, init_logging, install_runtime, ping};
    use crate::test_support::{ensure_registered, ACCEPTED_RUNTIME, REJECTED_RUNTIME};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(error.contains("absolute"));
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/runtime-bridge".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn lifecycle_round_trip_through_api() {
        ensure_registered();
        assert!(install_runtime(ACCEPTED_RUNTIME));
        assert!(cleanup_runtime(ACCEPTED_RUNTIME));
    }

    #[test]
    fn extension_failure_is_reported_as_false() {
        ensure_registered();
        assert!(!install_runtime(REJECTED_RUNTIME));
        assert!(!cleanup_runtime(REJECTED_RUNTIME));
    }

    #[test]
    fn null_runtime_is_rejected() {
        ensure_registered();
        assert!(!install_runtime(0));
        assert!(!cleanup_runtime(0));
    }
}
