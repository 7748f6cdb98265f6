//! `NODE_DEBUG` mailbox: carries an `--inspect*` flag stripped by a tool invocation of the
//! wrapper to the descendant invocation that runs the application script.
//!
//! The mailbox is absent until a tool invocation arms it. An armed mailbox is never
//! overwritten, a flag pinned by an ancestor wins over flags found further down the chain. The
//! application invocation takes the flag out, leaving the mailbox absent for its own children.

use crate::env::Env;
use log::debug;

/// Name of the mailbox variable.
pub const NODE_DEBUG: &str = "NODE_DEBUG";

/// Return the flag in flight, if any.
pub fn peek(env: &Env) -> Option<&str> {
    env.get(NODE_DEBUG)
}

/// Arm the mailbox with `flag` unless it is already armed. Returns true if the mailbox was
/// armed by this call.
pub fn arm(env: &mut Env, flag: &str) -> bool {
    if env.contains(NODE_DEBUG) {
        return false;
    }
    debug!(target: "node", "setting {NODE_DEBUG}={flag}");
    env.set(NODE_DEBUG, flag);
    true
}

/// Remove the flag in flight from the mailbox and return it.
pub fn take(env: &mut Env) -> Option<String> {
    env.remove(NODE_DEBUG)
}
