//! Process-wide slot for the extension served by the platform entry points.
//!
//! The platform entry points only receive a runtime address, so the extension
//! registers itself here once when its library is loaded.

use crate::error::{LifecycleError, LifecycleOperation};
use crate::lifecycle::{collapse, LifecycleController, NativeExtension};
use crate::runtime::{is_valid_address, RuntimeAddress};
use log::info;
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Extension type stored in the process-wide slot.
pub type SharedExtension = dyn NativeExtension + Send + Sync;

static EXTENSION: OnceCell<Box<SharedExtension>> = OnceCell::new();

/// Extension registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    AlreadyRegistered { existing: String },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRegistered { existing } => {
                write!(f, "native extension already registered: {existing}")
            }
        }
    }
}

impl Error for RegistryError {}

/// Registers the extension used by [`install_registered`] and
/// [`cleanup_registered`].
///
/// # Errors
/// Returns [`RegistryError::AlreadyRegistered`] on a second registration; the
/// first extension stays in place.
pub fn register_extension(extension: Box<SharedExtension>) -> Result<(), RegistryError> {
    let name = extension.name().to_string();
    EXTENSION.set(extension).map_err(|_| RegistryError::AlreadyRegistered {
        existing: registered_extension()
            .map(|existing| existing.name().to_string())
            .unwrap_or_default(),
    })?;
    info!(
        "event=extension_registered module=registry status=ok extension={}",
        name
    );
    Ok(())
}

pub fn registered_extension() -> Option<&'static SharedExtension> {
    EXTENSION.get().map(|extension| extension.as_ref())
}

/// Installs the registered extension with a synchronous invoker.
pub fn install_registered(address: RuntimeAddress) -> bool {
    match registered_controller(LifecycleOperation::Install, address) {
        Some(controller) => controller.install_with_sync_invoker(address),
        None => false,
    }
}

/// Cleans up the registered extension.
pub fn cleanup_registered(address: RuntimeAddress) -> bool {
    match registered_controller(LifecycleOperation::Cleanup, address) {
        Some(controller) => controller.cleanup(address),
        None => false,
    }
}

fn registered_controller(
    operation: LifecycleOperation,
    address: RuntimeAddress,
) -> Option<LifecycleController<&'static SharedExtension>> {
    let extension = registered_extension();
    let name = extension
        .map(|extension| extension.name())
        .unwrap_or("unregistered");
    // Null handles are reported as such even when nothing is registered.
    if !is_valid_address(address) {
        collapse(operation, name, address, Err(LifecycleError::InvalidHandle));
        return None;
    }
    let Some(extension) = extension else {
        collapse(
            operation,
            name,
            address,
            Err(LifecycleError::ExtensionMissing),
        );
        return None;
    };
    Some(LifecycleController::new(extension))
}
