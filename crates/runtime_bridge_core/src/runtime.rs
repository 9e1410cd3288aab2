//! Borrowed references to the host's script runtime.
//!
//! # Responsibility
//! - Turn the raw address handed over by the host into a checked reference.
//! - Keep that reference scoped to one call unless an invoker binds it.
//!
//! # Invariants
//! - A null address never becomes a [`RuntimeRef`].
//! - [`RuntimeRef`] is neither `Copy`, `Clone`, `Send` nor `Sync`.
//! - Rust code in this crate never dereferences the runtime pointer.

use crate::error::{LifecycleError, LifecycleResult};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::thread::{self, ThreadId};

/// Pointer-sized integer the host uses to pass its runtime (`jlong` on JNI).
pub type RuntimeAddress = i64;

/// Opaque script runtime owned by the host. Never constructed in Rust.
#[repr(C)]
pub struct JsRuntime {
    _private: [u8; 0],
    _not_send_sync: PhantomData<*mut u8>,
}

/// Checked, call-scoped borrow of the host runtime.
pub struct RuntimeRef<'rt> {
    ptr: NonNull<JsRuntime>,
    _borrow: PhantomData<&'rt mut JsRuntime>,
}

impl<'rt> RuntimeRef<'rt> {
    /// # Safety
    /// `ptr` must stay valid for `'rt` and only be used on the runtime thread.
    pub(crate) unsafe fn from_non_null(ptr: NonNull<JsRuntime>) -> Self {
        Self {
            ptr,
            _borrow: PhantomData,
        }
    }

    /// Raw address of the runtime, as the host passed it in.
    pub fn address(&self) -> RuntimeAddress {
        self.ptr.as_ptr() as usize as RuntimeAddress
    }

    /// Raw runtime pointer for extension code that talks to the engine.
    pub fn as_ptr(&self) -> *mut JsRuntime {
        self.ptr.as_ptr()
    }

    /// Shorter borrow of the same runtime for a nested call.
    pub fn reborrow(&mut self) -> RuntimeRef<'_> {
        RuntimeRef {
            ptr: self.ptr,
            _borrow: PhantomData,
        }
    }
}

impl Debug for RuntimeRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RuntimeRef")
            .field(&format_args!("{:#x}", self.address()))
            .finish()
    }
}

/// Runs `f` with a checked reference to the runtime at `address`.
///
/// The closure is higher-ranked over the borrow, so the reference cannot
/// outlive this call.
///
/// # Errors
/// - Returns [`LifecycleError::InvalidHandle`] when `address` is null.
pub fn with_runtime<R>(
    address: RuntimeAddress,
    f: impl for<'rt> FnOnce(RuntimeRef<'rt>) -> R,
) -> LifecycleResult<R> {
    let ptr = runtime_ptr(address).ok_or(LifecycleError::InvalidHandle)?;
    // SAFETY: the host keeps the runtime alive for the duration of the entry
    // call, and the reference does not escape `f`.
    let runtime = unsafe { RuntimeRef::from_non_null(ptr) };
    Ok(f(runtime))
}

/// Returns whether `address` can be turned into a runtime reference.
pub fn is_valid_address(address: RuntimeAddress) -> bool {
    runtime_ptr(address).is_some()
}

fn runtime_ptr(address: RuntimeAddress) -> Option<NonNull<JsRuntime>> {
    NonNull::new(address as usize as *mut JsRuntime)
}

/// Runtime binding held by an invoker for one install cycle.
///
/// Records the thread that created it; that thread owns the runtime.
pub(crate) struct BoundRuntime {
    ptr: Option<NonNull<JsRuntime>>,
    owner: ThreadId,
}

impl BoundRuntime {
    pub(crate) fn from_ref(runtime: &RuntimeRef<'_>) -> Self {
        Self {
            ptr: Some(runtime.ptr),
            owner: thread::current().id(),
        }
    }

    pub(crate) fn from_address(address: RuntimeAddress) -> Self {
        Self {
            ptr: runtime_ptr(address),
            owner: thread::current().id(),
        }
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.ptr.is_some()
    }

    pub(crate) fn address(&self) -> RuntimeAddress {
        self.ptr
            .map(|ptr| ptr.as_ptr() as usize as RuntimeAddress)
            .unwrap_or(0)
    }

    pub(crate) fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Runs `f` against the bound runtime. Returns `false` when unbound.
    pub(crate) fn run(&self, f: impl for<'rt> FnOnce(RuntimeRef<'rt>)) -> bool {
        let Some(ptr) = self.ptr else {
            return false;
        };
        // SAFETY: the host keeps the runtime alive while the invoker is
        // installed, and callers checked the owner thread.
        let runtime = unsafe { RuntimeRef::from_non_null(ptr) };
        f(runtime);
        true
    }
}
