use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::HookError;
use crate::context::{Context, ContextGuard, ContextId, Frame};
use crate::scheduler;

/// Maps a callback's return value to the outcome of a scheduled replay.
type Settle<R> = fn(R) -> anyhow::Result<()>;

struct HookContext<A, R> {
    frame: Frame,
    callback: Box<dyn Fn(A) -> R>,
    args: RefCell<Option<A>>,
    settle: Settle<R>,
}

impl<A: Clone + 'static, R: 'static> HookContext<A, R> {
    fn invoke(self: &Rc<Self>, args: A) -> R {
        let _guard = ContextGuard::enter(self.clone());
        self.frame.begin();
        *self.args.borrow_mut() = Some(args.clone());
        let result = (self.callback)(args);
        self.frame.finish();
        result
    }
}

impl<A: Clone + 'static, R: 'static> Context for HookContext<A, R> {
    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn replay(self: Rc<Self>) -> Result<(), HookError> {
        let args = self.args.borrow().clone();
        let Some(args) = args else {
            return Ok(());
        };
        let result = self.invoke(args);
        (self.settle)(result).map_err(|source| HookError::Replay {
            context: self.frame.id(),
            source,
        })
    }
}

/// A callback with persistent hook state.
///
/// Every clone shares one execution context: calls made directly and replays
/// made by the scheduler see the same slots.
pub struct Hook<A, R> {
    context: Rc<HookContext<A, R>>,
}

/// Wraps `callback` so that `use_state` / `use_reducer` calls inside it keep
/// their values across invocations.
///
/// When a scheduled replay runs, the return value is discarded. Use
/// [`hooked_fallible`] when a replay should be able to fail.
pub fn hooked<A, R, F>(callback: F) -> Hook<A, R>
where
    A: Clone + 'static,
    R: 'static,
    F: Fn(A) -> R + 'static,
{
    Hook::new(callback, |_| Ok(()))
}

/// Like [`hooked`], but an `Err` returned during a scheduled replay fails the
/// flush with [`HookError::Replay`]. Direct calls return the `Result` as is.
pub fn hooked_fallible<A, T, E, F>(callback: F) -> Hook<A, Result<T, E>>
where
    A: Clone + 'static,
    T: 'static,
    E: Into<anyhow::Error> + 'static,
    F: Fn(A) -> Result<T, E> + 'static,
{
    Hook::new(callback, |result| result.map(drop).map_err(Into::into))
}

impl<A: Clone + 'static, R: 'static> Hook<A, R> {
    fn new(callback: impl Fn(A) -> R + 'static, settle: Settle<R>) -> Self {
        let context = Rc::new(HookContext {
            frame: Frame::new(),
            callback: Box::new(callback),
            args: RefCell::new(None),
            settle,
        });
        log::trace!("created hook {}", context.frame.id());
        Self { context }
    }

    /// Runs the callback as the current context. Disarms any pending replay,
    /// since this call is at least as fresh.
    pub fn call(&self, args: A) -> R {
        self.context.invoke(args)
    }

    /// Requests a deferred replay with the last arguments, exactly as a state
    /// write inside the hook would.
    pub fn reschedule(&self) {
        scheduler::request(self.context.clone());
    }
}

impl<A, R> Hook<A, R> {
    pub fn id(&self) -> ContextId {
        self.context.frame.id()
    }

    /// True while a flush is pending that will replay this hook.
    pub fn is_armed(&self) -> bool {
        self.context.frame.is_armed()
    }

    pub fn slot_count(&self) -> usize {
        self.context.frame.slot_count()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.context, &other.context)
    }
}

impl<A, R> Clone for Hook<A, R> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Hook<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id())
            .field("armed", &self.is_armed())
            .field("slots", &self.slot_count())
            .finish()
    }
}
