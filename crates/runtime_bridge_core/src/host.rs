//! Host-module session around the lifecycle controller.
//!
//! # Responsibility
//! - Track whether this host module has installed the extension.
//! - Skip redundant installs and re-arm after a successful cleanup.
//!
//! # Invariants
//! - `installed` only flips on a successful delegated call.
//! - A context address of `0` means "runtime not ready" and is never delegated.
//!
//! The lifecycle controller itself stays stateless; this bookkeeping belongs
//! to the host module that owns the entry points.
//!
//! The flag is per [`HostModule`] instance. A host that re-creates its module
//! for the same runtime must keep one instance alive (or share it) to keep
//! the skip-if-installed behavior across re-creation.

use crate::lifecycle::{LifecycleController, NativeExtension};
use crate::runtime::RuntimeAddress;
use log::{debug, error, info};

/// Source of the host's current runtime address.
pub trait RuntimeContextProvider {
    /// Current runtime address, `0` while the runtime is not available.
    fn runtime_address(&self) -> RuntimeAddress;
}

impl<F> RuntimeContextProvider for F
where
    F: Fn() -> RuntimeAddress,
{
    fn runtime_address(&self) -> RuntimeAddress {
        self()
    }
}

/// Host module that installs the extension once per runtime session.
pub struct HostModule<P, E> {
    context: P,
    controller: LifecycleController<E>,
    installed: bool,
}

impl<P, E> HostModule<P, E>
where
    P: RuntimeContextProvider,
    E: NativeExtension,
{
    pub fn new(context: P, extension: E) -> Self {
        Self {
            context,
            controller: LifecycleController::new(extension),
            installed: false,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn controller(&self) -> &LifecycleController<E> {
        &self.controller
    }

    /// Module start-up hook: installs eagerly when the runtime is ready.
    ///
    /// Failures are logged only; a later [`HostModule::install_rust_crate`]
    /// can retry.
    pub fn initialize(&mut self) {
        debug!("event=host_initialize module=host status=start");
        if self.installed {
            return;
        }
        let address = self.context.runtime_address();
        if address == 0 {
            error!("event=host_initialize module=host status=error reason=context_not_ready");
            return;
        }
        self.install_at(address);
    }

    /// Installs unless this module already did.
    pub fn install_rust_crate(&mut self) -> bool {
        if self.installed {
            debug!("event=host_install module=host status=skipped reason=already_installed");
            return true;
        }
        let address = self.context.runtime_address();
        if address == 0 {
            error!("event=host_install module=host status=error reason=context_not_ready");
            return false;
        }
        self.install_at(address)
    }

    /// Cleans up; re-arms install on success.
    pub fn cleanup_rust_crate(&mut self) -> bool {
        let address = self.context.runtime_address();
        if address == 0 {
            error!("event=host_cleanup module=host status=error reason=context_not_ready");
            return false;
        }
        let cleaned = self.controller.cleanup(address);
        if cleaned {
            self.installed = false;
        }
        info!(
            "event=host_cleanup module=host status={} installed={}",
            if cleaned { "ok" } else { "error" },
            self.installed
        );
        cleaned
    }

    fn install_at(&mut self, address: RuntimeAddress) -> bool {
        let installed = self.controller.install_with_sync_invoker(address);
        if installed {
            self.installed = true;
        }
        info!(
            "event=host_install module=host status={} installed={}",
            if installed { "ok" } else { "error" },
            self.installed
        );
        installed
    }
}
