//! Collections for aggregating multiple failures.
//!
//! [`ErrorList`] keeps every error in insertion order; [`ErrorSet`]
//! deduplicates by a derived key and counts suppressed duplicates, so retry
//! loops and batch jobs cannot grow an aggregate without bound. The `Sync`
//! variants serialize every operation behind one lock per instance and are
//! safe to share across threads.

mod list;
mod set;

pub use self::{
    list::{ErrorList, SyncErrorList},
    set::{ErrorSet, KeyExtractor, SetEntry, SyncErrorSet},
};

use crate::Error;

/// Assembles the tri-state aggregate error shared by both collections:
/// absence when empty, the single entry unwrapped, or a multi-error whose
/// text enumerates every constituent.
pub(crate) fn assemble(entries: Vec<(Error, usize)>) -> Option<Error> {
    match entries.as_slice() {
        [] => None,
        [(single, _)] => Some(single.clone()),
        many => {
            let mut message = format!("{} errors occurred: ", many.len());
            for (index, (error, count)) in many.iter().enumerate() {
                if index > 0 {
                    message.push_str("; ");
                }
                message.push('[');
                message.push_str(&error.to_string());
                message.push(']');
                if *count > 1 {
                    message.push_str(&format!(" (x{count})"));
                }
            }
            Some(Error::new(message))
        }
    }
}
