//! Client-side routing and state-reconstruction core for Angzarr services.
//!
//! Every aggregate, saga, process manager, and projector embeds this crate.
//! It routes commands and events to user handlers by type-URL suffix,
//! rebuilds typed aggregate state from event history with optional snapshot
//! baselines, and turns downstream rejections into structured compensation
//! contexts.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use angzarr_core::{CommandRouter, EventRouter, StateRouter};
//!
//! // Rebuild state per event type.
//! let state = StateRouter::<CartState>::new()
//!     .on::<ItemAdded>("ItemAdded", apply_item_added)
//!     .snapshot_as::<CartSnapshot>(CartState::from_snapshot);
//!
//! // Route commands, guard sequences, stamp emitted events.
//! let router = CommandRouter::new("cart", state)
//!     .on("AddItem", handle_add_item)
//!     .on_rejected("inventory", "ReserveStock", handle_reserve_rejected);
//!
//! let response = router.dispatch(&contextual_command)?;
//!
//! // React to events with a saga.
//! let saga = EventRouter::saga("saga-fulfillment")
//!     .domain("orders")
//!     .on("OrderCreated", reserve_stock);
//! ```
//!
//! Dispatch is synchronous and single-threaded; routers are immutable after
//! construction, so concurrent dispatches on independent inputs need no
//! locking.

pub mod builder;
pub mod compensation;
pub mod convert;
pub mod error;
pub mod proto;
pub mod proto_ext;
pub mod router;
pub mod traits;
pub mod validation;

// Re-export main types at crate root
pub use compensation::{rejection_from_any, CompensationContext};
pub use error::{CoreError, Result};
pub use router::{
    CommandHandler, CommandRejectedError, CommandResult, CommandRouter, EventRouter,
    PrepareHandler, ReactionHandler, RejectionHandler, RejectionOutput, RouterRole, StateRouter,
};

// Re-export builders and helpers
pub use builder::{events_from_response, root_from_cover, CommandBuilder, QueryBuilder};
pub use convert::{
    now, parse_timestamp, proto_to_uuid, type_name_from_url, type_suffix, type_url, uuid_to_proto,
    TYPE_URL_PREFIX,
};
pub use router::{event_book_from, event_page, new_event_book, new_event_book_multi, pack_any, UnpackAny};

// Re-export extension traits
pub use proto_ext::{
    calculate_next_sequence, calculate_set_next_seq, next_sequence, CommandBookExt, CommandPageExt,
    CoverExt, EventBookExt, EventPageExt, ProtoUuidExt, UuidExt,
};
