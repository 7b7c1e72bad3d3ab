use thiserror::Error;

use crate::context::ContextId;

#[derive(Debug, Error)]
pub enum HookError {
    /// `use_state` / `use_reducer` was called while no hooked callback was running.
    #[error("hook state used outside of a hooked callback")]
    NoActiveContext,

    /// The slot at `index` was created by a different call site type.
    #[error("slot {index} does not hold a `{expected}`; hook call order changed between invocations")]
    SlotTypeMismatch {
        index: usize,
        expected: &'static str,
    },

    /// A fallible hook returned an error while being replayed by a flush.
    #[error("replaying hook {context} failed")]
    Replay {
        context: ContextId,
        #[source]
        source: anyhow::Error,
    },
}
