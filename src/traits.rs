//! Transport interface the core consumes.
//!
//! These traits describe what the routing core expects from its transport
//! collaborator. Both in-process and distributed transports implement the
//! same traits, and tests substitute mocks.

use async_trait::async_trait;

use crate::error::Result;
use crate::proto::{BusinessResponse, CommandBook, EventBook, Query};

/// Trait for gateway operations (command submission).
///
/// Implement this trait to create mock clients for testing or alternative
/// transport implementations.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Submit a command book for dispatch.
    async fn execute(&self, command: CommandBook) -> Result<BusinessResponse>;
}

/// Trait for event query operations.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Get a single EventBook for the given query.
    async fn get_event_book(&self, query: Query) -> Result<EventBook>;

    /// Get all matching EventBooks.
    async fn get_events(&self, query: Query) -> Result<Vec<EventBook>>;
}
