//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `runtime_bridge_core` linkage without a host application.
//! - Run one install/cleanup cycle against a placeholder runtime.

use runtime_bridge_core::{CallInvoker, LifecycleController, NativeExtension, RuntimeRef};
use std::cell::Cell;
use std::rc::Rc;

/// Extension that submits one closure through the invoker on install.
#[derive(Default)]
struct SmokeExtension {
    closures_run: Rc<Cell<usize>>,
}

impl NativeExtension for SmokeExtension {
    fn name(&self) -> &str {
        "cli_smoke"
    }

    fn install(&self, _runtime: RuntimeRef<'_>, invoker: Rc<dyn CallInvoker>) -> bool {
        let counter = Rc::clone(&self.closures_run);
        invoker.invoke_async(Box::new(move |_runtime: RuntimeRef<'_>| {
            counter.set(counter.get() + 1)
        }));
        self.closures_run.get() == 1
    }

    fn cleanup(&self, _runtime: RuntimeRef<'_>) -> bool {
        true
    }
}

fn main() {
    println!("runtime_bridge_core ping={}", runtime_bridge_core::ping());
    println!(
        "runtime_bridge_core version={}",
        runtime_bridge_core::core_version()
    );

    // Stand-in runtime: only its address is used, never its contents.
    let placeholder = 0_u8;
    let address = &placeholder as *const u8 as usize as i64;

    let controller = LifecycleController::new(SmokeExtension::default());
    println!(
        "install={} cleanup={} null_install={}",
        controller.install_with_sync_invoker(address),
        controller.cleanup(address),
        controller.install_with_sync_invoker(0)
    );
}
