//! Shared accessors for anything carrying a routing envelope.

use crate::proto::{CommandBook, Cover, EventBook, Notification, Query};

use super::constants::{DEFAULT_EDITION, UNKNOWN_DOMAIN};
use super::uuid::ProtoUuidExt;

/// Accessors for types that carry an optional routing [`Cover`].
///
/// Books, queries, and notifications all address an aggregate the same way;
/// implementing `cover()` once gives each of them the derived accessors
/// below, with the fallbacks dispatch relies on: a missing or blank domain
/// reads as [`UNKNOWN_DOMAIN`], a missing correlation id as the empty
/// string, and a missing edition as the main timeline.
pub trait CoverExt {
    /// The routing envelope, when one is attached.
    fn cover(&self) -> Option<&Cover>;

    /// Domain the cover addresses.
    ///
    /// Well-formed traffic always names a domain; anything else reads as
    /// [`UNKNOWN_DOMAIN`] so routing lookups and log fields stay printable.
    fn domain(&self) -> &str {
        match self.cover() {
            Some(c) if !c.domain.is_empty() => c.domain.as_str(),
            _ => UNKNOWN_DOMAIN,
        }
    }

    /// Correlation id shared by causally related traffic, or "" when unset.
    fn correlation_id(&self) -> &str {
        match self.cover() {
            Some(c) => c.correlation_id.as_str(),
            None => "",
        }
    }

    /// True when a non-empty correlation id is attached.
    ///
    /// Process managers gate dispatch on this.
    fn has_correlation_id(&self) -> bool {
        !self.correlation_id().is_empty()
    }

    /// Aggregate root, when the traffic is root-scoped and the wire bytes
    /// form a valid UUID.
    fn root_uuid(&self) -> Option<uuid::Uuid> {
        self.cover()
            .and_then(|c| c.root.as_ref())
            .and_then(|r| r.to_uuid().ok())
    }

    /// Canonical lowercase-hex rendering of the root, when present.
    fn root_id_hex(&self) -> Option<String> {
        self.cover()
            .and_then(|c| c.root.as_ref())
            .map(|r| r.to_hex())
    }

    /// Name of the timeline this cover selects.
    ///
    /// An absent or empty edition means the main timeline.
    fn edition(&self) -> &str {
        match self.edition_opt() {
            Some(name) => name,
            None => DEFAULT_EDITION,
        }
    }

    /// Edition name without the main-timeline fallback.
    fn edition_opt(&self) -> Option<&str> {
        let name = self.cover()?.edition.as_ref()?.name.as_str();
        (!name.is_empty()).then_some(name)
    }
}

impl CoverExt for EventBook {
    fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }
}

impl CoverExt for CommandBook {
    fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }
}

impl CoverExt for Notification {
    fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }
}

impl CoverExt for Query {
    fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }
}

impl CoverExt for Cover {
    fn cover(&self) -> Option<&Cover> {
        Some(self)
    }
}
