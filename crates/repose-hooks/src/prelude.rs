pub use crate::config::{FlushPolicy, HookConfig, with_config};
pub use crate::context::current;
pub use crate::error::HookError;
pub use crate::hook::{Hook, hooked, hooked_fallible};
pub use crate::platform::{run_microtasks, tick};
pub use crate::reducer::{
    Dispatch, Update, use_reducer, use_reducer_with, use_state, use_state_with,
};
