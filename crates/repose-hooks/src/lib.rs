//! # Hooks, slots, and batched replays
//!
//! `repose-hooks` gives plain callbacks persistent state. There are three
//! main pieces:
//!
//! - `hooked` — wraps a callback into a `Hook` with its own slot store.
//! - `use_state` / `use_reducer` — order‑based state bound to the running hook.
//! - the scheduler — replays hooks whose state changed, once per tick.
//!
//! ## Hooked callbacks
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use repose_hooks::prelude::*;
//!
//! let renders = Rc::new(Cell::new(0));
//! let counter = hooked_fallible({
//!     let renders = renders.clone();
//!     move |()| -> Result<Dispatch<i32, Update<i32>>, HookError> {
//!         renders.set(renders.get() + 1);
//!         let (_count, set_count) = use_state(0)?;
//!         Ok(set_count)
//!     }
//! });
//!
//! let set_count = counter.call(())?;
//! tick(|| {
//!     set_count.update(|c| c + 1);
//!     set_count.update(|c| c + 1);
//! })?;
//!
//! // Two writes, one replay.
//! assert_eq!(renders.get(), 2);
//! assert_eq!(set_count.get(), 2);
//! # Ok::<(), HookError>(())
//! ```
//!
//! - State is order‑based: the Nth state call of an invocation always refers
//!   to the Nth slot. Keep the calls unconditional.
//! - A setter applies its write immediately, then arms the hook. The replay
//!   happens at the next quantum boundary (`tick` / `run_microtasks`, or the
//!   host installed with `set_host`).
//! - Calling the hook directly before that boundary disarms it, and the flush
//!   skips it.
//!
//! ## Nesting
//!
//! A hook may call other hooks. Each call installs its own context and puts
//! the caller's back when it returns (or unwinds), so state never leaks
//! between them. `current()` reports the innermost running hook.
//!
//! ## Errors
//!
//! State calls outside a hook return `HookError::NoActiveContext`. A hook made
//! with `hooked_fallible` that fails during a replay fails the flush with
//! `HookError::Replay`. See `FlushPolicy` for what happens to the rest of the
//! batch.

pub mod config;
pub mod context;
pub mod error;
pub mod hook;
pub mod platform;
pub mod prelude;
pub mod reducer;
pub mod scheduler;
pub mod slots;

pub use config::{FlushPolicy, HookConfig, config, configure, with_config};
pub use context::{ContextHandle, ContextId, current};
pub use error::HookError;
pub use hook::{Hook, hooked, hooked_fallible};
pub use platform::{
    Host, Microtask, MicrotaskQueue, has_pending_microtasks, queue_microtask, reset_host,
    run_microtasks, set_host, tick,
};
pub use reducer::{Dispatch, Update, use_reducer, use_reducer_with, use_state, use_state_with};
pub use scheduler::{is_flush_scheduled, pending_count};
