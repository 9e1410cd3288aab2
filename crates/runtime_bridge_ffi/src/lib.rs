//! Platform entry points for the runtime bridge.
//!
//! - [`api`]: sync functions exposed to Dart through flutter_rust_bridge.
//! - [`jni`]: `extern "C"` symbols the Android host module binds to.

pub mod api;
pub mod jni;

#[cfg(test)]
mod test_support;
