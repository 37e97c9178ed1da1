//! Page extension traits for EventPage and CommandPage.
//!
//! Provides convenient accessors for sequence, type URL, and payload decoding.

use crate::convert::type_suffix;
use crate::proto::{event_page, CommandPage, EventPage, MergeStrategy};

/// Extension trait for the EventPage wire type.
pub trait EventPageExt {
    /// Get the sequence number from this page.
    fn sequence_num(&self) -> u32;

    /// Get the type URL of the inline event, if present.
    fn type_url(&self) -> Option<&str>;

    /// Get the routing suffix of the inline event, if present.
    fn suffix(&self) -> Option<&str>;

    /// Get the raw payload bytes of the inline event, if present.
    fn payload_bytes(&self) -> Option<&[u8]>;

    /// True when the page carries only an external payload reference.
    fn is_external(&self) -> bool;

    /// Decode the event payload as a specific message type.
    ///
    /// Returns None if the event is missing, the routing suffix does not
    /// match, or decoding fails.
    fn decode<M: prost::Message + Default>(&self, suffix: &str) -> Option<M>;
}

impl EventPageExt for EventPage {
    fn sequence_num(&self) -> u32 {
        self.sequence
    }

    fn type_url(&self) -> Option<&str> {
        match &self.payload {
            Some(event_page::Payload::Event(e)) => Some(e.type_url.as_str()),
            _ => None,
        }
    }

    fn suffix(&self) -> Option<&str> {
        self.type_url().map(type_suffix)
    }

    fn payload_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Some(event_page::Payload::Event(e)) => Some(e.value.as_slice()),
            _ => None,
        }
    }

    fn is_external(&self) -> bool {
        matches!(&self.payload, Some(event_page::Payload::External(_)))
    }

    fn decode<M: prost::Message + Default>(&self, suffix: &str) -> Option<M> {
        let event = match &self.payload {
            Some(event_page::Payload::Event(e)) => e,
            _ => return None,
        };
        if type_suffix(&event.type_url) != suffix {
            return None;
        }
        M::decode(event.value.as_slice()).ok()
    }
}

/// Extension trait for the CommandPage wire type.
pub trait CommandPageExt {
    /// Get the declared sequence number from this page.
    fn sequence_num(&self) -> u32;

    /// Get the type URL of the command, if present.
    fn type_url(&self) -> Option<&str>;

    /// Get the routing suffix of the command, if present.
    fn suffix(&self) -> Option<&str>;

    /// Get the raw payload bytes, if present.
    fn payload_bytes(&self) -> Option<&[u8]>;

    /// Decode the command payload as a specific message type.
    ///
    /// Returns None if the command is missing, the routing suffix does not
    /// match, or decoding fails.
    fn decode<M: prost::Message + Default>(&self, suffix: &str) -> Option<M>;

    /// Get the merge strategy for this command.
    ///
    /// Unknown wire values fall back to the strict strategy.
    fn strategy(&self) -> MergeStrategy;
}

impl CommandPageExt for CommandPage {
    fn sequence_num(&self) -> u32 {
        self.sequence
    }

    fn type_url(&self) -> Option<&str> {
        self.command.as_ref().map(|c| c.type_url.as_str())
    }

    fn suffix(&self) -> Option<&str> {
        self.type_url().map(type_suffix)
    }

    fn payload_bytes(&self) -> Option<&[u8]> {
        self.command.as_ref().map(|c| c.value.as_slice())
    }

    fn decode<M: prost::Message + Default>(&self, suffix: &str) -> Option<M> {
        let command = self.command.as_ref()?;
        if type_suffix(&command.type_url) != suffix {
            return None;
        }
        M::decode(command.value.as_slice()).ok()
    }

    fn strategy(&self) -> MergeStrategy {
        MergeStrategy::try_from(self.merge_strategy).unwrap_or(MergeStrategy::MergeStrict)
    }
}
