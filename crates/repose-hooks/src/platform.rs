//! Host deferral for scheduler flushes.
//!
//! The scheduler never runs a flush inline. It hands the flush to the thread's
//! [`Host`], which must run it once the current synchronous work is done, in
//! FIFO order with other deferred tasks.
//!
//! By default that host is the thread-local [`MicrotaskQueue`]. Drain it with
//! [`run_microtasks`], or use [`tick`] to run a closure as one synchronous
//! tick followed by the quantum boundary:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use repose_hooks::{queue_microtask, tick};
//!
//! let log = Rc::new(Cell::new(0));
//! let out = tick({
//!     let log = log.clone();
//!     move || {
//!         queue_microtask(move || {
//!             log.set(log.get() + 1);
//!             Ok(())
//!         });
//!         "sync part"
//!     }
//! })?;
//! assert_eq!(out, "sync part");
//! assert_eq!(log.get(), 1);
//! # Ok::<(), repose_hooks::HookError>(())
//! ```
//!
//! Hosts that own an event loop install their own implementation with
//! [`set_host`] and call each task after the current callback stack unwinds.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::HookError;

/// A deferred unit of work. An `Err` is the failure of that unit only.
pub type Microtask = Box<dyn FnOnce() -> Result<(), HookError> + 'static>;

/// Runs work after the current synchronous execution completes.
pub trait Host {
    fn defer(&self, task: Microtask);
}

/// The default host: a per-thread FIFO queue drained by [`run_microtasks`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MicrotaskQueue;

impl Host for MicrotaskQueue {
    fn defer(&self, task: Microtask) {
        QUEUE.with(|queue| queue.borrow_mut().push_back(task));
    }
}

thread_local! {
    static QUEUE: RefCell<VecDeque<Microtask>> = RefCell::new(VecDeque::new());
    static HOST: RefCell<Option<Rc<dyn Host>>> = const { RefCell::new(None) };
}

/// Replaces the thread's host and returns the previous custom one, if any.
pub fn set_host(host: Rc<dyn Host>) -> Option<Rc<dyn Host>> {
    HOST.with(|slot| slot.replace(Some(host)))
}

/// Goes back to the default [`MicrotaskQueue`].
pub fn reset_host() {
    HOST.with(|slot| slot.replace(None));
}

pub(crate) fn defer(task: Microtask) {
    let host = HOST.with(|slot| slot.borrow().clone());
    match host {
        Some(host) => host.defer(task),
        None => MicrotaskQueue.defer(task),
    }
}

pub fn queue_microtask(task: impl FnOnce() -> Result<(), HookError> + 'static) {
    MicrotaskQueue.defer(Box::new(task));
}

pub fn has_pending_microtasks() -> bool {
    QUEUE.with(|queue| !queue.borrow().is_empty())
}

/// Drains the default queue, including tasks queued while draining, and
/// returns how many ran.
///
/// Stops at the first failing task and returns its error. Tasks behind it stay
/// queued for the next drain.
pub fn run_microtasks() -> Result<usize, HookError> {
    let mut ran = 0;
    loop {
        let next = QUEUE.with(|queue| queue.borrow_mut().pop_front());
        let Some(task) = next else {
            return Ok(ran);
        };
        ran += 1;
        task()?;
    }
}

/// Runs `f` as one synchronous tick, then drains the microtask queue.
pub fn tick<R>(f: impl FnOnce() -> R) -> Result<R, HookError> {
    let out = f();
    run_microtasks()?;
    Ok(out)
}
