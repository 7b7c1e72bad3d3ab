//! Batched replay of hooks whose state changed.
//!
//! A state write arms its hook and adds it to the thread's batch. The first
//! addition after a flush hands one flush task to the host (see
//! [`platform`](crate::platform)), so any number of writes during one tick
//! cost a single replay per hook. Hooks called directly before the flush
//! runs are disarmed by that call and skipped.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::HookError;
use crate::config::{FlushPolicy, config};
use crate::context::{Context, ContextId};
use crate::platform;

#[derive(Default)]
struct Batch {
    pending: IndexMap<ContextId, Rc<dyn Context>>,
    flush_scheduled: bool,
}

thread_local! {
    static BATCH: RefCell<Batch> = RefCell::new(Batch::default());
}

pub(crate) fn request(context: Rc<dyn Context>) {
    let id = context.frame().id();
    let schedule_flush = BATCH.with(|batch| {
        let mut batch = batch.borrow_mut();
        if batch.pending.contains_key(&id) {
            log::trace!("hook {id} already queued");
            return false;
        }
        context.frame().arm();
        batch.pending.insert(id, context);
        log::trace!("hook {id} queued for replay");
        !mem::replace(&mut batch.flush_scheduled, true)
    });

    if schedule_flush {
        platform::defer(Box::new(flush));
    }
}

fn flush() -> Result<(), HookError> {
    let pending = BATCH.with(|batch| {
        let mut batch = batch.borrow_mut();
        batch.flush_scheduled = false;
        mem::take(&mut batch.pending)
    });
    let policy = config().flush_policy;
    let total = pending.len();
    let mut replayed = 0;
    let mut first_error = None;

    for (id, context) in pending {
        // A direct call since the request already ran the hook with fresh state.
        if !context.frame().is_armed() {
            log::trace!("hook {id} ran since it was queued; skipping");
            continue;
        }
        replayed += 1;
        if let Err(err) = context.replay() {
            match policy {
                FlushPolicy::AbortOnError => {
                    log::debug!("flush aborted by hook {id} after {replayed} of {total} hooks");
                    return Err(err);
                }
                FlushPolicy::ContinueOnError => {
                    match &err {
                        HookError::Replay { source, .. } => log::error!("{err}: {source:#}"),
                        other => log::error!("{other}"),
                    }
                    first_error.get_or_insert(err);
                }
            }
        }
    }

    log::debug!("flushed {replayed} of {total} queued hooks");
    first_error.map_or(Ok(()), Err)
}

/// Number of hooks waiting for the next flush.
pub fn pending_count() -> usize {
    BATCH.with(|batch| batch.borrow().pending.len())
}

/// True between the first request of a tick and the start of its flush.
pub fn is_flush_scheduled() -> bool {
    BATCH.with(|batch| batch.borrow().flush_scheduled)
}
