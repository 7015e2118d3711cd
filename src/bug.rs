//! The fatal half of the pass's error handling split (spec §7).
//!
//! User-level ownership violations are reported through [`crate::diagnostics`]
//! and never abort the pass. Everything else -- a constant used where a
//! location is expected, a `static-branch` on a predicate other than
//! `initialized`, a `yielded` convention at a function boundary, a
//! non-canonical value, a stack leak, an unrecognized opcode -- indicates
//! that the IR handed to this pass was not well-formed, which is a defect in
//! an earlier stage, not in the program being compiled. These abort the
//! process.

use std::fmt::Display;

/// Report an internal precondition failure and abort.
///
/// `where_` names the transfer function or driver stage that detected the
/// problem; `reason` is a short, specific description. Never call this for
/// anything a user's program can trigger.
pub fn precondition_failure(where_: &str, reason: impl Display) -> ! {
    log::error!("object-state normalization precondition failure in `{where_}`: {reason}");
    panic!("object-state normalization precondition failure in `{where_}`: {reason}");
}

/// Shorthand for [`precondition_failure`] with a `format!`-style reason.
macro_rules! bug {
    ($where_:expr, $($arg:tt)*) => {
        $crate::bug::precondition_failure($where_, format!($($arg)*))
    };
}

pub(crate) use bug;
