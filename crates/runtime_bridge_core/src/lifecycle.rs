//! Install/cleanup lifecycle for the native extension.
//!
//! # Responsibility
//! - Check the runtime handle before anything is delegated.
//! - Delegate install/cleanup to the extension and report its outcome.
//! - Stop extension panics at this layer.
//!
//! # Invariants
//! - A null handle returns `false` and never reaches the extension.
//! - The extension's boolean is reported verbatim.
//! - The controller holds no per-runtime state; repeated installs are the
//!   extension's concern.

use crate::error::{LifecycleError, LifecycleOperation, LifecycleResult};
use crate::invoker::{CallInvoker, SyncCallInvoker};
use crate::logging::describe_panic_payload;
use crate::runtime::{with_runtime, RuntimeAddress, RuntimeRef};
use log::{debug, error, info};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Entry points a native extension exposes to the bridge.
pub trait NativeExtension {
    /// Name used in log events.
    fn name(&self) -> &str;

    /// Binds the extension's surface onto `runtime`.
    fn install(&self, runtime: RuntimeRef<'_>, invoker: Rc<dyn CallInvoker>) -> bool;

    /// Releases the bindings made by [`NativeExtension::install`].
    ///
    /// Must tolerate being called without a prior successful install.
    fn cleanup(&self, runtime: RuntimeRef<'_>) -> bool;
}

impl<T: NativeExtension + ?Sized> NativeExtension for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn install(&self, runtime: RuntimeRef<'_>, invoker: Rc<dyn CallInvoker>) -> bool {
        (**self).install(runtime, invoker)
    }

    fn cleanup(&self, runtime: RuntimeRef<'_>) -> bool {
        (**self).cleanup(runtime)
    }
}

/// Stateless install/cleanup front for one extension.
#[derive(Debug)]
pub struct LifecycleController<E> {
    extension: E,
}

impl<E: NativeExtension> LifecycleController<E> {
    pub fn new(extension: E) -> Self {
        Self { extension }
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    /// Installs with a caller-supplied invoker.
    ///
    /// The invoker is expected to be bound to the same runtime; this is not
    /// checked here.
    pub fn install(&self, address: RuntimeAddress, invoker: Rc<dyn CallInvoker>) -> bool {
        let outcome = self.try_install(address, invoker);
        collapse(
            LifecycleOperation::Install,
            self.extension.name(),
            address,
            outcome,
        )
    }

    /// Installs with a [`SyncCallInvoker`] bound to `address`.
    pub fn install_with_sync_invoker(&self, address: RuntimeAddress) -> bool {
        let outcome = self.try_install_with_sync_invoker(address);
        collapse(
            LifecycleOperation::Install,
            self.extension.name(),
            address,
            outcome,
        )
    }

    pub fn cleanup(&self, address: RuntimeAddress) -> bool {
        let outcome = self.try_cleanup(address);
        collapse(
            LifecycleOperation::Cleanup,
            self.extension.name(),
            address,
            outcome,
        )
    }

    /// # Errors
    /// - [`LifecycleError::InvalidHandle`] when `address` is null.
    /// - [`LifecycleError::DelegateFailed`] when the extension returns `false`.
    /// - [`LifecycleError::DelegatePanicked`] when the extension panics.
    pub fn try_install(
        &self,
        address: RuntimeAddress,
        invoker: Rc<dyn CallInvoker>,
    ) -> LifecycleResult<()> {
        with_runtime(address, |runtime| {
            delegate(LifecycleOperation::Install, || {
                self.extension.install(runtime, invoker)
            })
        })
        .and_then(|outcome| outcome)
    }

    /// Same as [`LifecycleController::try_install`], building the invoker here.
    pub fn try_install_with_sync_invoker(&self, address: RuntimeAddress) -> LifecycleResult<()> {
        with_runtime(address, |runtime| {
            let invoker = SyncCallInvoker::bind(&runtime);
            debug!(
                "event=invoker_bound module=lifecycle status=ok extension={} runtime={:#x} cycle_id={}",
                self.extension.name(),
                address,
                invoker.cycle_id()
            );
            let invoker: Rc<dyn CallInvoker> = Rc::new(invoker);
            delegate(LifecycleOperation::Install, || {
                self.extension.install(runtime, invoker)
            })
        })
        .and_then(|outcome| outcome)
    }

    /// # Errors
    /// Same classes as [`LifecycleController::try_install`].
    pub fn try_cleanup(&self, address: RuntimeAddress) -> LifecycleResult<()> {
        with_runtime(address, |runtime| {
            delegate(LifecycleOperation::Cleanup, || {
                self.extension.cleanup(runtime)
            })
        })
        .and_then(|outcome| outcome)
    }
}

fn delegate(operation: LifecycleOperation, call: impl FnOnce() -> bool) -> LifecycleResult<()> {
    // The host runtime cannot be unwound through, so panics end here.
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(true) => Ok(()),
        Ok(false) => Err(LifecycleError::DelegateFailed { operation }),
        Err(payload) => Err(LifecycleError::DelegatePanicked {
            operation,
            message: describe_panic_payload(&*payload),
        }),
    }
}

/// Logs one lifecycle outcome and collapses it to the boundary boolean.
pub(crate) fn collapse(
    operation: LifecycleOperation,
    extension: &str,
    address: RuntimeAddress,
    outcome: LifecycleResult<()>,
) -> bool {
    match outcome {
        Ok(()) => {
            info!(
                "event={} module=lifecycle status=ok extension={} runtime={:#x}",
                operation, extension, address
            );
            true
        }
        Err(err) => {
            error!(
                "event={} module=lifecycle status=error reason={} extension={} runtime={:#x} message={}",
                operation,
                err.reason(),
                extension,
                address,
                err
            );
            false
        }
    }
}
