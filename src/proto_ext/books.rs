//! Book extension traits and sequence accounting.
//!
//! `next_sequence` is the canonical computation; command emission and
//! sequence validation defer to it.

use crate::proto::{CommandBook, CommandPage, EventBook, EventPage, MergeStrategy, Snapshot};

use super::cover::CoverExt;
use super::pages::CommandPageExt;

/// Compute the next sequence number from pages and an optional snapshot.
///
/// Returns (last page sequence + 1), OR (snapshot sequence + 1) if no pages,
/// OR 0 if neither.
pub fn calculate_next_sequence(pages: &[EventPage], snapshot: Option<&Snapshot>) -> u32 {
    if let Some(last_page) = pages.last() {
        last_page.sequence + 1
    } else {
        snapshot.map(|s| s.sequence + 1).unwrap_or(0)
    }
}

/// Canonical next-sequence accounting for an optional book.
///
/// An absent book, like a book with neither snapshot nor pages, is an empty
/// history whose next event carries sequence 0.
pub fn next_sequence(book: Option<&EventBook>) -> u32 {
    match book {
        Some(b) => calculate_next_sequence(&b.pages, b.snapshot.as_ref()),
        None => 0,
    }
}

/// Recompute and set the `next_sequence` field on an EventBook.
pub fn calculate_set_next_seq(book: &mut EventBook) {
    book.next_sequence = calculate_next_sequence(&book.pages, book.snapshot.as_ref());
}

/// Extension trait for the EventBook wire type (beyond CoverExt).
pub trait EventBookExt: CoverExt {
    /// Sequence the next event must carry, derived from pages/snapshot.
    fn next_sequence(&self) -> u32;

    /// Check if the event book has no pages.
    fn is_empty(&self) -> bool;

    /// Get the last event page, if any.
    fn last_page(&self) -> Option<&EventPage>;

    /// Get the first event page, if any.
    fn first_page(&self) -> Option<&EventPage>;
}

impl EventBookExt for EventBook {
    fn next_sequence(&self) -> u32 {
        calculate_next_sequence(&self.pages, self.snapshot.as_ref())
    }

    fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn last_page(&self) -> Option<&EventPage> {
        self.pages.last()
    }

    fn first_page(&self) -> Option<&EventPage> {
        self.pages.first()
    }
}

/// Extension trait for the CommandBook wire type (beyond CoverExt).
pub trait CommandBookExt: CoverExt {
    /// Get the declared sequence from the first command page.
    fn command_sequence(&self) -> u32;

    /// Get the first command page, if any.
    fn first_command(&self) -> Option<&CommandPage>;

    /// Get the merge strategy from the first command page.
    ///
    /// Defaults to strict when the book has no pages.
    fn merge_strategy(&self) -> MergeStrategy;
}

impl CommandBookExt for CommandBook {
    fn command_sequence(&self) -> u32 {
        self.pages.first().map(|p| p.sequence).unwrap_or(0)
    }

    fn first_command(&self) -> Option<&CommandPage> {
        self.pages.first()
    }

    fn merge_strategy(&self) -> MergeStrategy {
        self.pages
            .first()
            .map(|p| p.strategy())
            .unwrap_or(MergeStrategy::MergeStrict)
    }
}
