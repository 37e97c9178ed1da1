//! Wire types for the Angzarr routing core.
//!
//! These message structs are maintained by hand in prost-generated shape
//! (field tags, oneofs, enumerations) so the crate builds without `protoc`.
//! Encoding is wire-compatible with the framework schema; tags must not be
//! reused or renumbered.

/// 16-byte identifier for aggregate roots.
///
/// Canonical rendering is lowercase hex; see `ProtoUuidExt::to_hex`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Uuid {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
}

/// Alternate timeline selector, attached to a cover by name.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Edition {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Routing envelope attached to every book and notification.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cover {
    /// Aggregate domain. Non-empty for well-formed traffic.
    #[prost(string, tag = "1")]
    pub domain: String,
    /// Aggregate root. Absent for domain-wide traffic.
    #[prost(message, optional, tag = "2")]
    pub root: Option<Uuid>,
    /// Identifier shared by causally-related commands and events.
    #[prost(string, tag = "3")]
    pub correlation_id: String,
    /// Alternate timeline, when not the main one.
    #[prost(message, optional, tag = "4")]
    pub edition: Option<Edition>,
}

/// Baseline state captured at some sequence, letting fold skip prior history.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Snapshot {
    /// Sequence of the last event folded into `state`.
    #[prost(uint32, tag = "1")]
    pub sequence: u32,
    #[prost(message, optional, tag = "2")]
    pub state: Option<::prost_types::Any>,
    #[prost(enumeration = "SnapshotRetention", tag = "3")]
    pub retention: i32,
}

/// Pointer to payload bytes held outside the event store (claim check).
///
/// Opaque to the routing core.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PayloadReference {
    #[prost(string, tag = "1")]
    pub uri: String,
    #[prost(string, tag = "2")]
    pub digest: String,
}

/// A sequence-stamped event payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventPage {
    #[prost(uint32, tag = "1")]
    pub sequence: u32,
    #[prost(message, optional, tag = "2")]
    pub created_at: Option<::prost_types::Timestamp>,
    /// Inline event or external reference; never both.
    #[prost(oneof = "event_page::Payload", tags = "3, 4")]
    pub payload: Option<event_page::Payload>,
}

/// Nested message and enum types in `EventPage`.
pub mod event_page {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "3")]
        Event(::prost_types::Any),
        #[prost(message, tag = "4")]
        External(super::PayloadReference),
    }
}

/// A sequence-stamped command payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandPage {
    /// Declared sequence; must equal the target's next sequence at dispatch.
    #[prost(uint32, tag = "1")]
    pub sequence: u32,
    #[prost(message, optional, tag = "2")]
    pub command: Option<::prost_types::Any>,
    #[prost(enumeration = "MergeStrategy", tag = "3")]
    pub merge_strategy: i32,
}

/// Ordered event history for one aggregate, plus an optional snapshot baseline.
///
/// Page sequences are strictly monotonically increasing; with a snapshot
/// present, every page carries `sequence > snapshot.sequence`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventBook {
    #[prost(message, optional, tag = "1")]
    pub cover: Option<Cover>,
    #[prost(message, optional, tag = "2")]
    pub snapshot: Option<Snapshot>,
    #[prost(message, repeated, tag = "3")]
    pub pages: Vec<EventPage>,
    /// Sequence the next event must carry. Set by the framework on load;
    /// validation recomputes it from pages/snapshot.
    #[prost(uint32, tag = "4")]
    pub next_sequence: u32,
}

/// Ordered command pages addressed at one aggregate.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandBook {
    #[prost(message, optional, tag = "1")]
    pub cover: Option<Cover>,
    #[prost(message, repeated, tag = "2")]
    pub pages: Vec<CommandPage>,
}

/// Full input to command dispatch: the command plus the aggregate's history.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContextualCommand {
    #[prost(message, optional, tag = "1")]
    pub command: Option<CommandBook>,
    #[prost(message, optional, tag = "2")]
    pub events: Option<EventBook>,
}

/// Outcome of command dispatch, discriminated by the populated variant.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BusinessResponse {
    #[prost(oneof = "business_response::Result", tags = "1, 2, 3")]
    pub result: Option<business_response::Result>,
}

/// Nested message and enum types in `BusinessResponse`.
pub mod business_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        /// Events authored by the handler.
        #[prost(message, tag = "1")]
        Events(super::EventBook),
        /// The command was rejected.
        #[prost(message, tag = "2")]
        Revocation(super::RevocationResponse),
        /// Out-of-band notification for the caller.
        #[prost(message, tag = "3")]
        Notification(super::Notification),
    }
}

/// Rejection outcome carrying a human-readable reason.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RevocationResponse {
    #[prost(string, tag = "1")]
    pub reason: String,
}

/// Out-of-band message addressed by cover.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Notification {
    #[prost(message, optional, tag = "1")]
    pub cover: Option<Cover>,
    #[prost(message, optional, tag = "2")]
    pub sent_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub payload: Option<::prost_types::Any>,
}

/// Structured rejection delivered back to the issuer of a command.
///
/// When a compensating command is itself rejected, the outer rejection embeds
/// the inner one through `rejected_command`; `CompensationContext` walks the
/// chain.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RejectionNotification {
    #[prost(string, tag = "1")]
    pub rejection_reason: String,
    #[prost(message, optional, tag = "2")]
    pub rejected_command: Option<CommandBook>,
    /// Component that issued the rejected command.
    #[prost(string, tag = "3")]
    pub issuer_name: String,
    #[prost(enumeration = "IssuerType", tag = "4")]
    pub issuer_type: i32,
    /// The aggregate that rejected the command.
    #[prost(message, optional, tag = "5")]
    pub source_aggregate: Option<Cover>,
    /// Sequence of the event that triggered the rejected command.
    #[prost(uint32, tag = "6")]
    pub source_event_sequence: u32,
}

/// Event query addressed by cover.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Query {
    #[prost(message, optional, tag = "1")]
    pub cover: Option<Cover>,
    #[prost(oneof = "query::Selection", tags = "2, 3")]
    pub selection: Option<query::Selection>,
}

/// Nested message and enum types in `Query`.
pub mod query {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Selection {
        #[prost(message, tag = "2")]
        Range(super::SequenceRange),
        #[prost(message, tag = "3")]
        Temporal(super::TemporalQuery),
    }
}

/// Inclusive sequence range.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SequenceRange {
    #[prost(uint32, tag = "1")]
    pub lower: u32,
    #[prost(uint32, optional, tag = "2")]
    pub upper: Option<u32>,
}

/// Point-in-time selection for temporal queries.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TemporalQuery {
    #[prost(oneof = "temporal_query::PointInTime", tags = "1, 2")]
    pub point_in_time: Option<temporal_query::PointInTime>,
}

/// Nested message and enum types in `TemporalQuery`.
pub mod temporal_query {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PointInTime {
        #[prost(uint32, tag = "1")]
        AsOfSequence(u32),
        #[prost(message, tag = "2")]
        AsOfTime(::prost_types::Timestamp),
    }
}

/// Conflict-handling strategy recorded on each command page.
///
/// The core records the strategy and surfaces it to transport/server
/// components; it does not enforce merge logic itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MergeStrategy {
    /// Fail on any concurrent predecessor.
    MergeStrict = 0,
    /// Succeed when the handler output is interleaving-independent.
    MergeCommutative = 1,
}

/// Snapshot lifecycle hint for the snapshot store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SnapshotRetention {
    RetentionDefault = 0,
    /// Keep even after newer snapshots supersede it.
    RetentionPinned = 1,
}

/// Role of the component that issued a rejected command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IssuerType {
    IssuerSaga = 0,
    IssuerProcessManager = 1,
    IssuerAggregate = 2,
}
