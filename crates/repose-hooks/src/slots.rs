use std::any::Any;
use std::rc::Rc;

/// Ordered, append-only hook storage for one context.
///
/// The Nth state call of an invocation always refers to the Nth slot. Slots
/// are type-erased; the call site knows what it stored and downcasts.
#[derive(Default)]
pub struct SlotStore {
    slots: Vec<Rc<dyn Any>>,
    cursor: usize,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Returns the cursor position and the slot stored there, if any.
    /// The cursor only advances when a slot exists; otherwise the caller is
    /// expected to follow up with [`push_next`](Self::push_next).
    pub(crate) fn take_next(&mut self) -> (usize, Option<Rc<dyn Any>>) {
        let index = self.cursor;
        match self.slots.get(index) {
            Some(slot) => {
                self.cursor += 1;
                (index, Some(slot.clone()))
            }
            None => (index, None),
        }
    }

    pub(crate) fn push_next(&mut self, slot: Rc<dyn Any>) {
        debug_assert_eq!(self.cursor, self.slots.len());
        self.slots.push(slot);
        self.cursor += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pass_appends_and_later_passes_reuse() {
        let mut store = SlotStore::new();
        assert!(store.is_empty());

        let (index, slot) = store.take_next();
        assert_eq!(index, 0);
        assert!(slot.is_none());
        store.push_next(Rc::new(7u8));
        assert_eq!(store.cursor(), 1);

        store.rewind();
        let (index, slot) = store.take_next();
        assert_eq!(index, 0);
        let slot = slot.expect("slot 0 exists after the first pass");
        assert_eq!(*slot.downcast::<u8>().unwrap(), 7);
        assert_eq!(store.cursor(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cursor_stays_put_at_the_end() {
        let mut store = SlotStore::new();
        store.push_next(Rc::new("a"));
        let _ = store.take_next();
        assert_eq!(store.take_next().0, 1);
        assert_eq!(store.cursor(), 1);
    }
}
