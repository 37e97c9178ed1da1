//! Guard helpers for command handlers.
//!
//! A handler rejects by returning [`CommandRejectedError`]; these helpers
//! keep the guard clauses at the top of a handler to one line each and the
//! rejection reasons uniform across domains.
//!
//! # Example
//!
//! ```rust,ignore
//! use angzarr_core::validation::{ensure, ensure_exists, ensure_positive};
//!
//! fn handle_withdraw(state: &AccountState, amount: i64) -> CommandResult<EventBook> {
//!     ensure_exists(state.opened, "account")?;
//!     ensure_positive(amount, "withdrawal amount")?;
//!     ensure(state.balance >= amount, "balance too low")?;
//!     // ... emit Withdrawn
//! }
//! ```

use crate::router::{CommandRejectedError, CommandResult};

/// Reject with the given reason unless the condition holds.
///
/// The primitive the other guards build on; use it directly for one-off
/// business rules.
pub fn ensure(condition: bool, reason: impl Into<String>) -> CommandResult<()> {
    if condition {
        Ok(())
    } else {
        Err(CommandRejectedError::new(reason))
    }
}

/// Reject unless the aggregate has prior history.
pub fn ensure_exists(exists: bool, what: &str) -> CommandResult<()> {
    ensure(exists, format!("{what} does not exist"))
}

/// Reject when the aggregate already has history.
///
/// The usual guard on creation commands replayed against a live root.
pub fn ensure_absent(exists: bool, what: &str) -> CommandResult<()> {
    ensure(!exists, format!("{what} already exists"))
}

/// Reject unless the value is greater than zero.
pub fn ensure_positive<T: PartialOrd + Default>(value: T, what: &str) -> CommandResult<()> {
    ensure(
        value > T::default(),
        format!("{what} must be greater than zero"),
    )
}
