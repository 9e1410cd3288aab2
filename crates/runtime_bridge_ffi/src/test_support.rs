//! Shared extension registered once for this crate's unit tests.

use runtime_bridge_core::{register_extension, CallInvoker, NativeExtension, RuntimeRef};
use std::rc::Rc;
use std::sync::Once;

/// Runtime address the test extension accepts.
pub(crate) const ACCEPTED_RUNTIME: i64 = 0x55_0000;
/// Non-null runtime address the test extension refuses.
pub(crate) const REJECTED_RUNTIME: i64 = 0x66_0000;

struct GatedExtension;

impl NativeExtension for GatedExtension {
    fn name(&self) -> &str {
        "gated"
    }

    fn install(&self, runtime: RuntimeRef<'_>, _invoker: Rc<dyn CallInvoker>) -> bool {
        runtime.address() == ACCEPTED_RUNTIME
    }

    fn cleanup(&self, runtime: RuntimeRef<'_>) -> bool {
        runtime.address() == ACCEPTED_RUNTIME
    }
}

pub(crate) fn ensure_registered() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        register_extension(Box::new(GatedExtension)).expect("register gated extension");
    });
}
