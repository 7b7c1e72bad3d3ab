use std::any::{Any, type_name};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::HookError;
use crate::config::config;
use crate::scheduler;
use crate::slots::SlotStore;

thread_local! {
    static CURRENT_CONTEXT: RefCell<Option<Rc<dyn Context>>> = const { RefCell::new(None) };
    static NEXT_CONTEXT_ID: Cell<u64> = const { Cell::new(1) };
}

/// Identity of one hooked callback. Unique within a thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        NEXT_CONTEXT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            ContextId(id)
        })
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The parts of an execution context that do not depend on the callback's
/// argument and return types.
pub(crate) struct Frame {
    id: ContextId,
    armed: Cell<bool>,
    slots: RefCell<SlotStore>,
    /// Slot count reached by the last invocation that returned normally.
    settled: Cell<Option<usize>>,
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self {
            id: ContextId::next(),
            armed: Cell::new(false),
            slots: RefCell::new(SlotStore::new()),
            settled: Cell::new(None),
        }
    }

    pub(crate) fn id(&self) -> ContextId {
        self.id
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed.get()
    }

    pub(crate) fn arm(&self) {
        self.armed.set(true);
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Start of every invocation, direct or replayed.
    pub(crate) fn begin(&self) {
        self.armed.set(false);
        self.slots.borrow_mut().rewind();
    }

    pub(crate) fn finish(&self) {
        let used = self.slots.borrow().cursor();
        if let Some(previous) = self.settled.replace(Some(used))
            && previous != used
            && config().slot_diagnostics
        {
            log::warn!(
                "hook {}: {} state calls this invocation, {} last time; slots may be misaligned",
                self.id,
                used,
                previous
            );
        }
    }

    /// Returns the slot under the cursor and advances, creating it with
    /// `create` the first time this position is reached.
    ///
    /// `create` runs without the slot store borrowed.
    pub(crate) fn next_slot<T: Any>(
        &self,
        create: impl FnOnce() -> Rc<T>,
    ) -> Result<Rc<T>, HookError> {
        let (index, existing) = self.slots.borrow_mut().take_next();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let fresh: Rc<dyn Any> = create();
                self.slots.borrow_mut().push_next(fresh.clone());
                fresh
            }
        };

        slot.downcast::<T>()
            .map_err(|_| HookError::SlotTypeMismatch {
                index,
                expected: type_name::<T>(),
            })
    }
}

/// A type-erased execution context: what the registry and the scheduler see.
pub(crate) trait Context {
    fn frame(&self) -> &Frame;

    /// Re-invokes the callback with the arguments of its last call.
    fn replay(self: Rc<Self>) -> Result<(), HookError>;
}

pub(crate) fn current_context() -> Option<Rc<dyn Context>> {
    CURRENT_CONTEXT.with(|current| current.borrow().clone())
}

/// Installs a context as current and puts the previous one back on drop,
/// including while unwinding from a panicking callback.
pub(crate) struct ContextGuard {
    previous: Option<Rc<dyn Context>>,
}

impl ContextGuard {
    pub(crate) fn enter(context: Rc<dyn Context>) -> Self {
        log::trace!("enter hook {}", context.frame().id());
        let previous = CURRENT_CONTEXT.with(|current| current.replace(Some(context)));
        Self { previous }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let exited = CURRENT_CONTEXT.with(|current| current.replace(previous));
        if let Some(exited) = exited {
            log::trace!("exit hook {}", exited.frame().id());
        }
    }
}

/// A weak handle to the context of the running hook, obtained with [`current`].
#[derive(Clone)]
pub struct ContextHandle {
    id: ContextId,
    context: Weak<dyn Context>,
}

impl ContextHandle {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn is_armed(&self) -> bool {
        self.context
            .upgrade()
            .is_some_and(|context| context.frame().is_armed())
    }

    /// Requests a deferred replay of the hook. Returns `false` if the hook has
    /// been dropped.
    pub fn reschedule(&self) -> bool {
        match self.context.upgrade() {
            Some(context) => {
                scheduler::request(context);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("id", &self.id)
            .field("alive", &(self.context.strong_count() > 0))
            .finish()
    }
}

/// The context of the innermost hooked callback currently running, if any.
pub fn current() -> Option<ContextHandle> {
    current_context().map(|context| ContextHandle {
        id: context.frame().id(),
        context: Rc::downgrade(&context),
    })
}
