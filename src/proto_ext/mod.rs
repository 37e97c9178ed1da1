//! Extension traits for wire types.
//!
//! Provides accessor methods for common patterns like extracting domain,
//! correlation_id, and root from Cover-bearing types, plus the canonical
//! sequence accounting.
//!
//! ## Module Organization
//!
//! - [`constants`] - Shared constants (fallback domain, edition, suffixes)
//! - [`cover`] - CoverExt trait for accessing cover fields
//! - [`uuid`] - UUID conversion traits
//! - [`pages`] - EventPageExt and CommandPageExt traits
//! - [`books`] - EventBookExt, CommandBookExt, and sequence helpers

pub mod books;
pub mod constants;
pub mod cover;
pub mod pages;
pub mod uuid;

// Re-export all public items for convenient imports
pub use books::{
    calculate_next_sequence, calculate_set_next_seq, next_sequence, CommandBookExt, EventBookExt,
};
pub use constants::{DEFAULT_EDITION, NOTIFICATION_SUFFIX, UNKNOWN_DOMAIN};
pub use cover::CoverExt;
pub use pages::{CommandPageExt, EventPageExt};
pub use uuid::{ProtoUuidExt, UuidExt};
