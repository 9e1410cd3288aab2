//! Runtime bridge between a host script runtime and a native extension.
//!
//! The host hands over a raw runtime address; this crate checks it, binds a
//! synchronous call invoker to it, and drives the extension's install and
//! cleanup routines, reporting only a boolean back across the boundary.

pub mod error;
pub mod host;
pub mod invoker;
pub mod lifecycle;
pub mod logging;
pub mod registry;
pub mod runtime;

pub use error::{LifecycleError, LifecycleOperation, LifecycleResult};
pub use host::{HostModule, RuntimeContextProvider};
pub use invoker::{CallFunc, CallInvoker, SchedulerPriority, SyncCallInvoker};
pub use lifecycle::{LifecycleController, NativeExtension};
pub use logging::{default_log_level, init_logging, logging_status, resolve_log_level};
pub use registry::{
    cleanup_registered, install_registered, register_extension, registered_extension,
    RegistryError, SharedExtension,
};
pub use runtime::{is_valid_address, with_runtime, JsRuntime, RuntimeAddress, RuntimeRef};

/// Liveness check the host can call before any runtime exists.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the bridge crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
