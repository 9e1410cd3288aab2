//! JNI entry points for the Android host module.
//!
//! # FFI contract
//! - Called on the thread that owns the script runtime.
//! - `jsi_ptr` is the host runtime address; `0` is rejected by the core.
//! - Returns `JNI_TRUE`/`JNI_FALSE`; never unwinds into the JVM.
//!
//! `JNIEnv*` and `jobject` are unused and kept opaque.

#![allow(non_snake_case)]

use log::debug;
use runtime_bridge_core::{cleanup_registered, install_registered};
use std::ffi::c_void;

/// JNI `jboolean`.
pub type JBoolean = u8;

pub const JNI_FALSE: JBoolean = 0;
pub const JNI_TRUE: JBoolean = 1;

/// Installs the registered extension into the runtime at `jsi_ptr`.
#[no_mangle]
pub extern "C" fn Java_com_cartridge_controller_ControllerModule_nativeInstallRustCrate(
    _env: *mut c_void,
    _thiz: *mut c_void,
    jsi_ptr: i64,
) -> JBoolean {
    debug!(
        "event=native_install module=jni status=start jsi_ptr={:#x}",
        jsi_ptr
    );
    let installed = install_registered(jsi_ptr);
    debug!(
        "event=native_install module=jni status=done result={}",
        installed
    );
    to_jboolean(installed)
}

/// Cleans up the registered extension from the runtime at `jsi_ptr`.
#[no_mangle]
pub extern "C" fn Java_com_cartridge_controller_ControllerModule_nativeCleanupRustCrate(
    _env: *mut c_void,
    _thiz: *mut c_void,
    jsi_ptr: i64,
) -> JBoolean {
    debug!("event=native_cleanup module=jni status=start");
    let cleaned = cleanup_registered(jsi_ptr);
    debug!(
        "event=native_cleanup module=jni status=done result={}",
        cleaned
    );
    to_jboolean(cleaned)
}

fn to_jboolean(value: bool) -> JBoolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}
