//! Call invocation capability handed to the native extension.
//!
//! # Responsibility
//! - Give the extension a scheduler-shaped "run this on the runtime" API.
//! - Execute every submission synchronously on the calling thread.
//!
//! # Invariants
//! - A submitted closure has fully run before `invoke_*` returns, or never runs.
//! - Submissions never unwind and never report failure to the caller; a
//!   panicking closure is stopped and logged here.
//! - Submissions from a thread other than the binding thread are dropped.
//!
//! # See also
//! - [`crate::lifecycle`] for where the invoker is created and passed on.

use crate::logging::describe_panic_payload;
use crate::runtime::{BoundRuntime, RuntimeAddress, RuntimeRef};
use log::{error, trace};
use std::fmt::{Debug, Formatter};
use std::panic::{self, AssertUnwindSafe};
use uuid::Uuid;

/// Unit of work submitted to an invoker.
pub type CallFunc = Box<dyn for<'rt> FnOnce(RuntimeRef<'rt>)>;

/// Scheduling classes the extension may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SchedulerPriority {
    Immediate,
    UserBlocking,
    #[default]
    Normal,
    Low,
    Idle,
}

/// Capability for scheduling closures onto the runtime thread.
pub trait CallInvoker {
    /// Schedules `func`; may be deferred by implementations that queue.
    fn invoke_async(&self, func: CallFunc);

    /// Runs `func` before returning to the caller.
    fn invoke_sync(&self, func: CallFunc);

    /// Schedules `func` with a scheduling hint.
    fn invoke_async_with_priority(&self, priority: SchedulerPriority, func: CallFunc);
}

/// Invoker that runs every closure immediately on the calling thread.
///
/// Only correct while every submission comes from the thread that owns the
/// runtime. That thread is captured at construction time.
pub struct SyncCallInvoker {
    runtime: BoundRuntime,
    cycle_id: Uuid,
}

impl SyncCallInvoker {
    /// Binds a new invoker to a checked runtime reference.
    pub fn bind(runtime: &RuntimeRef<'_>) -> Self {
        Self::with_runtime(BoundRuntime::from_ref(runtime))
    }

    /// Binds a new invoker to a raw address. A null address gives an
    /// invoker that silently skips every submission.
    pub fn from_address(address: RuntimeAddress) -> Self {
        Self::with_runtime(BoundRuntime::from_address(address))
    }

    fn with_runtime(runtime: BoundRuntime) -> Self {
        Self {
            runtime,
            cycle_id: Uuid::new_v4(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.runtime.is_bound()
    }

    /// Address of the bound runtime, `0` when unbound.
    pub fn runtime_address(&self) -> RuntimeAddress {
        self.runtime.address()
    }

    /// Identifier correlating log lines of one install cycle.
    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    fn run(&self, call: &'static str, func: CallFunc) {
        if !self.runtime.is_bound() {
            trace!(
                "event=invoke module=invoker status=skipped call={} reason=unbound cycle_id={}",
                call,
                self.cycle_id
            );
            return;
        }
        if !self.runtime.is_owner_thread() {
            error!(
                "event=invoke module=invoker status=error call={} reason=foreign_thread cycle_id={}",
                call, self.cycle_id
            );
            return;
        }
        // Callers may sit on host frames that cannot be unwound through.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.runtime.run(func)));
        if let Err(payload) = outcome {
            error!(
                "event=invoke module=invoker status=error call={} reason=closure_panicked cycle_id={} payload={}",
                call,
                self.cycle_id,
                describe_panic_payload(&*payload)
            );
        }
    }
}

impl CallInvoker for SyncCallInvoker {
    fn invoke_async(&self, func: CallFunc) {
        self.run("invoke_async", func);
    }

    fn invoke_sync(&self, func: CallFunc) {
        self.run("invoke_sync", func);
    }

    fn invoke_async_with_priority(&self, _priority: SchedulerPriority, func: CallFunc) {
        self.run("invoke_async_with_priority", func);
    }
}

impl Debug for SyncCallInvoker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCallInvoker")
            .field("runtime", &format_args!("{:#x}", self.runtime.address()))
            .field("cycle_id", &self.cycle_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CallInvoker, SchedulerPriority, SyncCallInvoker};
    use crate::runtime::{with_runtime, RuntimeRef};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const FAKE_RUNTIME: i64 = 0x5000;

    fn counting(counter: &Rc<Cell<usize>>) -> super::CallFunc {
        let counter = Rc::clone(counter);
        Box::new(move |_runtime: RuntimeRef<'_>| counter.set(counter.get() + 1))
    }

    #[test]
    fn invoke_async_runs_before_returning() {
        let invoker = SyncCallInvoker::from_address(FAKE_RUNTIME);
        let counter = Rc::new(Cell::new(0));

        invoker.invoke_async(counting(&counter));

        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn all_submission_variants_execute_exactly_once() {
        let invoker = SyncCallInvoker::from_address(FAKE_RUNTIME);
        let counter = Rc::new(Cell::new(0));

        invoker.invoke_sync(counting(&counter));
        assert_eq!(counter.get(), 1);
        invoker.invoke_async_with_priority(SchedulerPriority::Idle, counting(&counter));
        assert_eq!(counter.get(), 2);
        invoker.invoke_async_with_priority(SchedulerPriority::Immediate, counting(&counter));
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn closure_receives_bound_runtime() {
        let invoker = SyncCallInvoker::from_address(FAKE_RUNTIME);
        let seen = Rc::new(Cell::new(0_i64));
        let sink = Rc::clone(&seen);

        invoker.invoke_sync(Box::new(move |runtime: RuntimeRef<'_>| {
            sink.set(runtime.address())
        }));

        assert_eq!(seen.get(), FAKE_RUNTIME);
    }

    #[test]
    fn null_bound_invoker_never_runs_closure() {
        let invoker = SyncCallInvoker::from_address(0);
        let counter = Rc::new(Cell::new(0));

        invoker.invoke_async(counting(&counter));
        invoker.invoke_sync(counting(&counter));
        invoker.invoke_async_with_priority(SchedulerPriority::Normal, counting(&counter));

        assert!(!invoker.is_bound());
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn bind_uses_checked_reference() {
        let invoker =
            with_runtime(FAKE_RUNTIME, |runtime| SyncCallInvoker::bind(&runtime)).expect("runtime");
        assert!(invoker.is_bound());
        assert_eq!(invoker.runtime_address(), FAKE_RUNTIME);
    }

    #[test]
    fn nested_submission_is_reentrant() {
        let invoker = Rc::new(SyncCallInvoker::from_address(FAKE_RUNTIME));
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));

        let inner_invoker = Rc::clone(&invoker);
        let outer_order = Rc::clone(&order);
        invoker.invoke_async(Box::new(move |_: RuntimeRef<'_>| {
            outer_order.borrow_mut().push("outer-start");
            let inner_order = Rc::clone(&outer_order);
            inner_invoker.invoke_sync(Box::new(move |_: RuntimeRef<'_>| {
                inner_order.borrow_mut().push("inner")
            }));
            outer_order.borrow_mut().push("outer-end");
        }));

        assert_eq!(*order.borrow(), vec!["outer-start", "inner", "outer-end"]);
    }

    #[test]
    fn submission_from_foreign_thread_is_dropped() {
        struct SharedInvoker(*const SyncCallInvoker);
        // SAFETY: the test only reads through the pointer while the scope
        // below keeps the invoker alive.
        unsafe impl Send for SharedInvoker {}

        let invoker = SyncCallInvoker::from_address(FAKE_RUNTIME);
        let counter = Arc::new(AtomicUsize::new(0));
        let shared = SharedInvoker(&invoker);
        let thread_counter = Arc::clone(&counter);

        std::thread::scope(|scope| {
            scope.spawn(move || {
                let shared = shared;
                // SAFETY: see `SharedInvoker`.
                let invoker = unsafe { &*shared.0 };
                invoker.invoke_async(Box::new(move |_: RuntimeRef<'_>| {
                    thread_counter.fetch_add(1, Ordering::SeqCst);
                }));
            });
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panicking_closure_does_not_unwind_out_of_any_variant() {
        let invoker = SyncCallInvoker::from_address(FAKE_RUNTIME);
        let submissions: [(&str, fn(&SyncCallInvoker, super::CallFunc)); 3] = [
            ("invoke_async", |invoker, func| invoker.invoke_async(func)),
            ("invoke_sync", |invoker, func| invoker.invoke_sync(func)),
            ("invoke_async_with_priority", |invoker, func| {
                invoker.invoke_async_with_priority(SchedulerPriority::Low, func)
            }),
        ];

        for (call, submit) in submissions {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                submit(
                    &invoker,
                    Box::new(|_: RuntimeRef<'_>| panic!("closure failed")),
                )
            }));
            assert!(outcome.is_ok(), "{call} let a closure panic escape");
        }
    }

    #[test]
    fn invoker_stays_usable_after_closure_panic() {
        let invoker = SyncCallInvoker::from_address(FAKE_RUNTIME);
        let counter = Rc::new(Cell::new(0));

        invoker.invoke_sync(Box::new(|_: RuntimeRef<'_>| panic!("first call fails")));
        invoker.invoke_sync(counting(&counter));

        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn each_invoker_gets_own_cycle_id() {
        let first = SyncCallInvoker::from_address(FAKE_RUNTIME);
        let second = SyncCallInvoker::from_address(FAKE_RUNTIME);
        assert_ne!(first.cycle_id(), second.cycle_id());
    }
}
