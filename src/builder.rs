//! Fluent builders for commands and queries.
//!
//! Builders own the boundary validation story: non-empty domain, timestamp
//! parsing, required command payload. The routers assume valid inputs.

use crate::convert::{parse_timestamp, uuid_to_proto};
use crate::error::{CoreError, Result};
use crate::proto::{
    business_response, query::Selection, temporal_query::PointInTime, BusinessResponse,
    CommandBook, CommandPage, Cover, Edition, EventBook, MergeStrategy, Query, SequenceRange,
    TemporalQuery,
};
use crate::traits;
use prost::Message;
use uuid::Uuid;

/// Builder for constructing and submitting commands.
pub struct CommandBuilder {
    domain: String,
    root: Option<Uuid>,
    correlation_id: Option<String>,
    sequence: u32,
    merge_strategy: MergeStrategy,
    type_url: Option<String>,
    payload: Option<Vec<u8>>,
}

impl CommandBuilder {
    /// Start a command against the given domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            root: None,
            correlation_id: None,
            sequence: 0,
            merge_strategy: MergeStrategy::MergeStrict,
            type_url: None,
            payload: None,
        }
    }

    /// Target a specific aggregate root.
    pub fn root(mut self, root: Uuid) -> Self {
        self.root = Some(root);
        self
    }

    /// Set the correlation ID for request tracing.
    /// If not set, a random UUID will be generated.
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Set the expected sequence number for optimistic locking.
    pub fn sequence(mut self, seq: u32) -> Self {
        self.sequence = seq;
        self
    }

    /// Set the merge strategy recorded on the command page.
    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    /// Set the command type URL and message.
    pub fn command<M: Message>(mut self, type_url: impl Into<String>, message: &M) -> Self {
        self.type_url = Some(type_url.into());
        self.payload = Some(message.encode_to_vec());
        self
    }

    /// Build the CommandBook without submitting.
    pub fn build(self) -> Result<CommandBook> {
        self.build_inner()
    }

    fn build_inner(&self) -> Result<CommandBook> {
        if self.domain.is_empty() {
            return Err(CoreError::InvalidArgument("domain not set".to_string()));
        }
        let type_url = self
            .type_url
            .clone()
            .ok_or_else(|| CoreError::InvalidArgument("command type_url not set".to_string()))?;
        let payload = self
            .payload
            .clone()
            .ok_or_else(|| CoreError::InvalidArgument("command payload not set".to_string()))?;

        let correlation_id = self
            .correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(CommandBook {
            cover: Some(Cover {
                domain: self.domain.clone(),
                root: self.root.map(uuid_to_proto),
                correlation_id,
                edition: None,
            }),
            pages: vec![CommandPage {
                sequence: self.sequence,
                command: Some(prost_types::Any {
                    type_url,
                    value: payload,
                }),
                merge_strategy: self.merge_strategy as i32,
            }],
        })
    }

    /// Build and submit the command through a gateway.
    pub async fn execute<C: traits::GatewayClient>(self, client: &C) -> Result<BusinessResponse> {
        let command = self.build_inner()?;
        client.execute(command).await
    }
}

/// Builder for constructing and submitting queries.
#[derive(Debug)]
pub struct QueryBuilder {
    domain: String,
    root: Option<Uuid>,
    correlation_id: Option<String>,
    selection: Option<Selection>,
    edition: Option<String>,
}

impl QueryBuilder {
    /// Start a query against the given domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            root: None,
            correlation_id: None,
            selection: None,
            edition: None,
        }
    }

    /// Query a specific aggregate root.
    pub fn root(mut self, root: Uuid) -> Self {
        self.root = Some(root);
        self
    }

    /// Query by correlation ID instead of root.
    pub fn by_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self.root = None;
        self
    }

    /// Query events from a specific edition (diverged timeline).
    pub fn edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = Some(edition.into());
        self
    }

    /// Query a range of sequences (inclusive lower bound).
    pub fn range(mut self, lower: u32) -> Self {
        self.selection = Some(Selection::Range(SequenceRange { lower, upper: None }));
        self
    }

    /// Query a range of sequences with upper bound (inclusive).
    pub fn range_to(mut self, lower: u32, upper: u32) -> Self {
        self.selection = Some(Selection::Range(SequenceRange {
            lower,
            upper: Some(upper),
        }));
        self
    }

    /// Query state as of a specific sequence number.
    pub fn as_of_sequence(mut self, seq: u32) -> Self {
        self.selection = Some(Selection::Temporal(TemporalQuery {
            point_in_time: Some(PointInTime::AsOfSequence(seq)),
        }));
        self
    }

    /// Query state as of a specific timestamp (RFC3339 format).
    pub fn as_of_time(mut self, rfc3339: &str) -> Result<Self> {
        let timestamp = parse_timestamp(rfc3339)?;
        self.selection = Some(Selection::Temporal(TemporalQuery {
            point_in_time: Some(PointInTime::AsOfTime(timestamp)),
        }));
        Ok(self)
    }

    /// Build the Query without submitting.
    pub fn build(self) -> Result<Query> {
        self.build_inner()
    }

    fn build_inner(&self) -> Result<Query> {
        if self.domain.is_empty() {
            return Err(CoreError::InvalidArgument("domain not set".to_string()));
        }
        Ok(Query {
            cover: Some(Cover {
                domain: self.domain.clone(),
                root: self.root.map(uuid_to_proto),
                correlation_id: self.correlation_id.clone().unwrap_or_default(),
                edition: self.edition.clone().map(|name| Edition { name }),
            }),
            selection: self.selection.clone(),
        })
    }

    /// Build and submit the query, collecting all matching books.
    pub async fn execute<C: traits::QueryClient>(self, client: &C) -> Result<Vec<EventBook>> {
        let query = self.build_inner()?;
        client.get_events(query).await
    }
}

/// Extract the authored events from a business response, if any.
pub fn events_from_response(response: &BusinessResponse) -> Option<&EventBook> {
    match &response.result {
        Some(business_response::Result::Events(book)) => Some(book),
        _ => None,
    }
}

/// Extract the root UUID from a cover.
pub fn root_from_cover(cover: &Cover) -> Option<Uuid> {
    cover
        .root
        .as_ref()
        .and_then(|u| Uuid::from_slice(&u.value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto_ext::{CommandBookExt, CoverExt};

    fn payload() -> prost_types::Duration {
        prost_types::Duration {
            seconds: 5,
            nanos: 0,
        }
    }

    #[test]
    fn test_command_builder_happy_path() {
        let root = Uuid::new_v4();
        let book = CommandBuilder::new("orders")
            .root(root)
            .correlation_id("corr-1")
            .sequence(6)
            .merge_strategy(MergeStrategy::MergeCommutative)
            .command("type.googleapis.com/test.PlaceOrder", &payload())
            .build()
            .unwrap();

        assert_eq!(book.domain(), "orders");
        assert_eq!(book.root_uuid(), Some(root));
        assert_eq!(book.correlation_id(), "corr-1");
        assert_eq!(book.command_sequence(), 6);
        assert_eq!(book.merge_strategy(), MergeStrategy::MergeCommutative);
        assert_eq!(
            book.first_command().unwrap().command.as_ref().unwrap().type_url,
            "type.googleapis.com/test.PlaceOrder"
        );
    }

    #[test]
    fn test_command_builder_generates_correlation_id() {
        let book = CommandBuilder::new("orders")
            .command("test.PlaceOrder", &payload())
            .build()
            .unwrap();
        assert!(book.has_correlation_id());
    }

    #[test]
    fn test_command_builder_requires_payload() {
        let err = CommandBuilder::new("orders").build().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_command_builder_requires_domain() {
        let err = CommandBuilder::new("")
            .command("test.PlaceOrder", &payload())
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_query_builder_range() {
        let query = QueryBuilder::new("orders")
            .root(Uuid::new_v4())
            .range_to(3, 9)
            .build()
            .unwrap();
        match query.selection {
            Some(Selection::Range(range)) => {
                assert_eq!(range.lower, 3);
                assert_eq!(range.upper, Some(9));
            }
            other => panic!("expected range selection, got {:?}", other),
        }
    }

    #[test]
    fn test_query_builder_by_correlation_clears_root() {
        let query = QueryBuilder::new("orders")
            .root(Uuid::new_v4())
            .by_correlation_id("corr-1")
            .build()
            .unwrap();
        let cover = query.cover.unwrap();
        assert!(cover.root.is_none());
        assert_eq!(cover.correlation_id, "corr-1");
    }

    #[test]
    fn test_query_builder_as_of_time() {
        let query = QueryBuilder::new("orders")
            .as_of_time("2024-01-15T10:30:00Z")
            .unwrap()
            .build()
            .unwrap();
        match query.selection {
            Some(Selection::Temporal(t)) => match t.point_in_time {
                Some(PointInTime::AsOfTime(ts)) => assert_eq!(ts.seconds, 1705314600),
                other => panic!("expected as-of-time, got {:?}", other),
            },
            other => panic!("expected temporal selection, got {:?}", other),
        }
    }

    #[test]
    fn test_query_builder_invalid_timestamp() {
        let err = QueryBuilder::new("orders")
            .as_of_time("not a timestamp")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_query_builder_edition() {
        let query = QueryBuilder::new("orders")
            .edition("speculative")
            .build()
            .unwrap();
        assert_eq!(query.cover.unwrap().edition.unwrap().name, "speculative");
    }

    #[test]
    fn test_query_builder_requires_domain() {
        let err = QueryBuilder::new("").build().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_events_from_response() {
        let response = BusinessResponse {
            result: Some(business_response::Result::Events(EventBook::default())),
        };
        assert!(events_from_response(&response).is_some());
        assert!(events_from_response(&BusinessResponse::default()).is_none());
    }
}
