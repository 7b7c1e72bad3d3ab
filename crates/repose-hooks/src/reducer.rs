use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::HookError;
use crate::context::{Context, ContextId, current_context};
use crate::scheduler;

struct StateCell<S, Act> {
    value: RefCell<S>,
    reducer: Box<dyn Fn(&S, Act) -> S>,
}

/// Setter for one hook slot.
///
/// Every `Dispatch` handed out for the same slot compares equal, across all
/// invocations of the owning hook.
pub struct Dispatch<S, Act> {
    cell: Rc<StateCell<S, Act>>,
    owner: Weak<dyn Context>,
    owner_id: ContextId,
}

impl<S: Clone, Act> Dispatch<S, Act> {
    /// Folds `action` into the stored value with the slot's reducer, then asks
    /// the scheduler to replay the owning hook after the current tick.
    ///
    /// The new value is visible immediately to [`get`](Self::get) and to any
    /// later state read in the same tick.
    pub fn dispatch(&self, action: Act) {
        let previous = self.cell.value.borrow().clone();
        let next = (self.cell.reducer)(&previous, action);
        *self.cell.value.borrow_mut() = next;

        match self.owner.upgrade() {
            Some(owner) => scheduler::request(owner),
            None => log::debug!(
                "state written after hook {} was dropped; nothing to replay",
                self.owner_id
            ),
        }
    }

    pub fn get(&self) -> S {
        self.cell.value.borrow().clone()
    }
}

impl<S, Act> Dispatch<S, Act> {
    /// The hook this slot belongs to.
    pub fn owner(&self) -> ContextId {
        self.owner_id
    }
}

impl<S, Act> Clone for Dispatch<S, Act> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            owner: self.owner.clone(),
            owner_id: self.owner_id,
        }
    }
}

impl<S, Act> PartialEq for Dispatch<S, Act> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<S, Act> Eq for Dispatch<S, Act> {}

impl<S: fmt::Debug, Act> fmt::Debug for Dispatch<S, Act> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("owner", &self.owner_id)
            .field("value", &*self.cell.value.borrow())
            .finish()
    }
}

/// A `use_state` write: either a new value or a function of the previous one.
pub enum Update<S> {
    Replace(S),
    Apply(Box<dyn FnOnce(&S) -> S>),
}

impl<S> Update<S> {
    pub fn apply(self, previous: &S) -> S {
        match self {
            Update::Replace(value) => value,
            Update::Apply(f) => f(previous),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Update<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

impl<S: Clone + 'static> Dispatch<S, Update<S>> {
    pub fn set(&self, value: S) {
        self.dispatch(Update::Replace(value));
    }

    pub fn update(&self, f: impl FnOnce(&S) -> S + 'static) {
        self.dispatch(Update::Apply(Box::new(f)));
    }
}

fn lazy_update<S>(previous: &S, update: Update<S>) -> S {
    update.apply(previous)
}

fn use_cell<S, Act>(
    create: impl FnOnce() -> StateCell<S, Act>,
) -> Result<(S, Dispatch<S, Act>), HookError>
where
    S: Clone + 'static,
    Act: 'static,
{
    let owner = current_context().ok_or(HookError::NoActiveContext)?;
    let cell = owner.frame().next_slot(|| Rc::new(create()))?;
    let value = cell.value.borrow().clone();
    let dispatch = Dispatch {
        cell,
        owner_id: owner.frame().id(),
        owner: Rc::downgrade(&owner),
    };
    Ok((value, dispatch))
}

/// Returns the value of the next slot of the running hook and its setter.
///
/// The first invocation that reaches this call stores `initial`. `reducer` is
/// captured at the same time and reused by every later dispatch.
pub fn use_reducer<S, Act, F>(reducer: F, initial: S) -> Result<(S, Dispatch<S, Act>), HookError>
where
    S: Clone + 'static,
    Act: 'static,
    F: Fn(&S, Act) -> S + 'static,
{
    use_cell(move || StateCell {
        value: RefCell::new(initial),
        reducer: Box::new(reducer),
    })
}

/// [`use_reducer`] with a lazily computed initial value: `init(initial_arg)`
/// only runs when the slot is created.
pub fn use_reducer_with<S, Act, I, F>(
    reducer: F,
    initial_arg: I,
    init: impl FnOnce(I) -> S,
) -> Result<(S, Dispatch<S, Act>), HookError>
where
    S: Clone + 'static,
    Act: 'static,
    F: Fn(&S, Act) -> S + 'static,
{
    use_cell(move || StateCell {
        value: RefCell::new(init(initial_arg)),
        reducer: Box::new(reducer),
    })
}

pub fn use_state<S: Clone + 'static>(
    initial: S,
) -> Result<(S, Dispatch<S, Update<S>>), HookError> {
    use_reducer(lazy_update, initial)
}

/// [`use_state`] whose initial value is only computed the first time.
pub fn use_state_with<S: Clone + 'static>(
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S, Update<S>>), HookError> {
    use_reducer_with(lazy_update, (), |()| init())
}
