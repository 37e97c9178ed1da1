//! Command and event routing for aggregate, saga, and process-manager handlers.
//!
//! Routing keys are type-URL suffixes (the segment after the final `.` or
//! `/`), matched by exact equality. Routers are built fluently at startup and
//! are immutable afterwards; dispatch takes `&self`, so concurrent dispatches
//! on independent inputs need no locking.
//!
//! # Example
//!
//! ```rust,ignore
//! use angzarr_core::{CommandRouter, StateRouter};
//!
//! let state = StateRouter::<PlayerState>::new()
//!     .on::<PlayerRegistered>("PlayerRegistered", apply_registered)
//!     .on::<FundsDeposited>("FundsDeposited", apply_deposited);
//!
//! let router = CommandRouter::new("player", state)
//!     .on("RegisterPlayer", handle_register_player)
//!     .on("DepositFunds", handle_deposit_funds);
//! ```

mod command;
mod event;
mod state;

pub use command::{CommandHandler, CommandRouter, RejectionHandler, RejectionOutput};
pub use event::{DomainSubscriptions, EventRouter, PrepareHandler, ReactionHandler, RouterRole};
pub use state::{StateFactory, StateRouter};

use prost_types::Any;
use tonic::Status;

use crate::convert::{now, type_url};
use crate::proto::{CommandBook, EventBook, EventPage};

/// Error type for command rejection with a human-readable reason.
#[derive(Debug, Clone)]
pub struct CommandRejectedError {
    pub reason: String,
}

impl CommandRejectedError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for CommandRejectedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command rejected: {}", self.reason)
    }
}

impl std::error::Error for CommandRejectedError {}

impl From<CommandRejectedError> for Status {
    fn from(err: CommandRejectedError) -> Self {
        Status::failed_precondition(err.reason)
    }
}

/// Result type for command and reaction handlers.
pub type CommandResult<T> = std::result::Result<T, CommandRejectedError>;

/// Create an event page with the given sequence and inline payload.
pub fn event_page(seq: u32, event: Any) -> EventPage {
    EventPage {
        sequence: seq,
        created_at: Some(now()),
        payload: Some(crate::proto::event_page::Payload::Event(event)),
    }
}

/// Create an EventBook from a command book's cover and a set of pages.
pub fn event_book_from(command_book: &CommandBook, pages: Vec<EventPage>) -> EventBook {
    let next_sequence = crate::proto_ext::calculate_next_sequence(&pages, None);
    EventBook {
        cover: command_book.cover.clone(),
        snapshot: None,
        pages,
        next_sequence,
    }
}

/// Create an EventBook with a single event.
///
/// This is the common pattern for command handlers returning a single event.
pub fn new_event_book(command_book: &CommandBook, seq: u32, event: Any) -> EventBook {
    event_book_from(command_book, vec![event_page(seq, event)])
}

/// Create an EventBook with multiple events sequenced from `start_seq`.
pub fn new_event_book_multi(
    command_book: &CommandBook,
    start_seq: u32,
    events: Vec<Any>,
) -> EventBook {
    let pages = events
        .into_iter()
        .enumerate()
        .map(|(i, event)| event_page(start_seq + i as u32, event))
        .collect();
    event_book_from(command_book, pages)
}

/// Pack a protobuf message into an Any with the given type name.
pub fn pack_any<M: prost::Message>(type_name: &str, msg: &M) -> Any {
    Any {
        type_url: type_url(type_name),
        value: msg.encode_to_vec(),
    }
}

/// Helper trait for unpacking Any messages.
pub trait UnpackAny {
    /// Unpack an Any to a specific message type.
    fn unpack<M: prost::Message + Default>(&self) -> Result<M, prost::DecodeError>;
}

impl UnpackAny for Any {
    fn unpack<M: prost::Message + Default>(&self) -> Result<M, prost::DecodeError> {
        M::decode(self.value.as_slice())
    }
}
