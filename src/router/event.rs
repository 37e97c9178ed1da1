//! Event dispatch for saga and process-manager reactors.

use std::collections::{BTreeMap, HashMap};

use prost_types::Any;
use tonic::Status;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::convert::type_suffix;
use crate::proto::{event_page, CommandBook, Cover, EventBook};
use crate::proto_ext::CoverExt;
use crate::router::CommandResult;

/// Reaction handler function type.
///
/// Invoked per matched event page with the event payload, the source root,
/// the correlation id, and the prefetched state of each destination keyed by
/// root. Returns zero or more command books addressed at other aggregates.
pub type ReactionHandler =
    fn(&Any, Uuid, &str, &HashMap<Uuid, EventBook>) -> CommandResult<Vec<CommandBook>>;

/// Prepare handler function type.
///
/// Returns the covers of the destinations the reaction intends to address,
/// so the transport can prefetch their event books before dispatch.
pub type PrepareHandler = fn(&Any, Uuid, &str) -> Vec<Cover>;

/// Subscription table keyed by domain, suffixes sorted for stable output.
pub type DomainSubscriptions = BTreeMap<String, Vec<String>>;

/// Reactor role, controlling correlation requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterRole {
    /// Sagas react to any event in their subscribed domains.
    Saga,
    /// Process managers track a long-running flow; events without a
    /// correlation id are dropped.
    ProcessManager,
}

/// Routes events to reaction handlers by `(domain, type-suffix)`.
///
/// Built fluently: `domain` selects the current domain, and subsequent `on`
/// / `prepare` registrations attach to it. Calling `domain` again switches
/// scope without disturbing prior registrations. Registration happens
/// strictly before first dispatch; the router is immutable afterwards.
///
/// # Example
///
/// ```rust,ignore
/// let router = EventRouter::saga("saga-order-fulfillment")
///     .domain("orders")
///     .on("OrderCreated", reserve_stock)
///     .prepare("OrderCreated", reserve_stock_destinations)
///     .domain("inventory")
///     .on("StockReserved", confirm_order);
/// ```
pub struct EventRouter {
    name: String,
    role: RouterRole,
    current_domain: Option<String>,
    handlers: HashMap<String, HashMap<String, ReactionHandler>>,
    prepares: HashMap<String, HashMap<String, PrepareHandler>>,
}

impl EventRouter {
    /// Create a router for a saga reactor.
    pub fn saga(name: impl Into<String>) -> Self {
        Self::with_role(name, RouterRole::Saga)
    }

    /// Create a router for a process-manager reactor.
    ///
    /// Process managers require correlation: events whose correlation id is
    /// empty are dropped without invoking handlers.
    pub fn process_manager(name: impl Into<String>) -> Self {
        Self::with_role(name, RouterRole::ProcessManager)
    }

    fn with_role(name: impl Into<String>, role: RouterRole) -> Self {
        Self {
            name: name.into(),
            role,
            current_domain: None,
            handlers: HashMap::new(),
            prepares: HashMap::new(),
        }
    }

    /// Select the domain that subsequent registrations attach to.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.current_domain = Some(domain.into());
        self
    }

    /// Register a reaction handler for events with the given type suffix in
    /// the current domain.
    pub fn on(mut self, suffix: impl Into<String>, handler: ReactionHandler) -> Self {
        let domain = self.scope();
        self.handlers
            .entry(domain)
            .or_default()
            .insert(suffix.into(), handler);
        self
    }

    /// Register a prepare handler for events with the given type suffix in
    /// the current domain.
    pub fn prepare(mut self, suffix: impl Into<String>, handler: PrepareHandler) -> Self {
        let domain = self.scope();
        self.prepares
            .entry(domain)
            .or_default()
            .insert(suffix.into(), handler);
        self
    }

    fn scope(&self) -> String {
        self.current_domain
            .clone()
            .expect("domain() must be called before on()/prepare()")
    }

    /// Get the reactor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the reactor role.
    pub fn role(&self) -> RouterRole {
        self.role
    }

    /// True when dispatch drops uncorrelated events.
    pub fn requires_correlation(&self) -> bool {
        self.role == RouterRole::ProcessManager
    }

    /// Expose the subscription table for administrative queries.
    pub fn subscriptions(&self) -> DomainSubscriptions {
        self.handlers
            .iter()
            .map(|(domain, routes)| {
                let mut suffixes: Vec<String> = routes.keys().cloned().collect();
                suffixes.sort();
                (domain.clone(), suffixes)
            })
            .collect()
    }

    /// Collect the destination covers the matched prepare handlers address.
    ///
    /// Runs the same `(domain, suffix)` matching loop as dispatch, over the
    /// prepare table.
    pub fn prepare_destinations(&self, book: &EventBook) -> Vec<Cover> {
        let Some(routes) = self.prepares.get(book.domain()) else {
            return vec![];
        };
        let root = book.root_uuid().unwrap_or(Uuid::nil());
        let correlation_id = book.correlation_id();

        let mut destinations = Vec::new();
        for page in &book.pages {
            let Some(event_page::Payload::Event(event)) = &page.payload else {
                continue;
            };
            if let Some(handler) = routes.get(type_suffix(&event.type_url)) {
                destinations.extend(handler(event, root, correlation_id));
            }
        }
        destinations
    }

    /// Dispatch an event book, fanning out matched pages to their handlers.
    ///
    /// Pages are processed in order; unsubscribed `(domain, suffix)` pairs
    /// and external-only pages are skipped. Handlers run synchronously on the
    /// dispatching thread. Returns the accumulated command books.
    pub fn dispatch(
        &self,
        book: &EventBook,
        destinations: &HashMap<Uuid, EventBook>,
    ) -> Result<Vec<CommandBook>, Status> {
        let correlation_id = book.correlation_id();
        if self.requires_correlation() && correlation_id.is_empty() {
            warn!(
                reactor = %self.name,
                domain = book.domain(),
                "Dropping uncorrelated event book"
            );
            return Ok(vec![]);
        }

        let Some(routes) = self.handlers.get(book.domain()) else {
            return Ok(vec![]);
        };
        let root = book.root_uuid().unwrap_or(Uuid::nil());

        let mut commands = Vec::new();
        for page in &book.pages {
            let Some(event_page::Payload::Event(event)) = &page.payload else {
                continue;
            };
            let suffix = type_suffix(&event.type_url);
            let Some(handler) = routes.get(suffix) else {
                continue;
            };

            debug!(
                reactor = %self.name,
                domain = book.domain(),
                suffix,
                sequence = page.sequence,
                "Reacting to event"
            );

            let produced =
                handler(event, root, correlation_id, destinations).map_err(Status::from)?;
            commands.extend(produced);
        }
        Ok(commands)
    }
}
