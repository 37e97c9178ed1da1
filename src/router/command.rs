//! Command dispatch for aggregate handlers.

use std::collections::HashMap;

use prost::Message;
use prost_types::Any;
use tonic::Status;
use tracing::{debug, warn};

use crate::compensation::CompensationContext;
use crate::convert::type_suffix;
use crate::proto::{
    business_response, BusinessResponse, CommandBook, ContextualCommand, EventBook, Notification,
    RevocationResponse,
};
use crate::proto_ext::{next_sequence, CoverExt, NOTIFICATION_SUFFIX};
use crate::router::{CommandResult, StateRouter};

/// Command handler function type.
///
/// Takes the command book, the command Any, the rebuilt state, and the
/// sequence the first emitted event must carry. Returns an EventBook on
/// success or `CommandRejectedError` on business rejection.
pub type CommandHandler<S> = fn(&CommandBook, &Any, &S, u32) -> CommandResult<EventBook>;

/// Rejection handler function type.
///
/// Invoked when a command this service issued earlier was rejected
/// downstream. Receives the parsed rejection context and the rebuilt state;
/// returns compensation output.
pub type RejectionHandler<S> = fn(&CompensationContext, &S) -> CommandResult<RejectionOutput>;

/// Output of a rejection handler: compensating events, a notification to
/// forward, or neither.
#[derive(Default)]
pub struct RejectionOutput {
    pub events: Option<EventBook>,
    pub notification: Option<Notification>,
}

impl RejectionOutput {
    /// Compensating events for the issuer's own domain.
    pub fn events(book: EventBook) -> Self {
        Self {
            events: Some(book),
            notification: None,
        }
    }

    /// A notification to forward instead of events.
    pub fn notification(notification: Notification) -> Self {
        Self {
            events: None,
            notification: Some(notification),
        }
    }

    /// No compensation output.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Routes commands to handlers by type-URL suffix.
///
/// Rebuilds state from the supplied history, guards the declared sequence
/// against the aggregate head, invokes the matched handler, and stamps the
/// emitted events. Rejection notifications route instead to compensation
/// handlers keyed by `(target domain, command suffix)`.
pub struct CommandRouter<S> {
    domain: String,
    state: StateRouter<S>,
    handlers: HashMap<String, CommandHandler<S>>,
    rejection_handlers: HashMap<String, RejectionHandler<S>>,
}

impl<S: Default + 'static> CommandRouter<S> {
    /// Create a new command router for the given domain.
    pub fn new(domain: impl Into<String>, state: StateRouter<S>) -> Self {
        Self {
            domain: domain.into(),
            state,
            handlers: HashMap::new(),
            rejection_handlers: HashMap::new(),
        }
    }

    /// Register a command handler for commands with the given type suffix.
    pub fn on(mut self, suffix: impl Into<String>, handler: CommandHandler<S>) -> Self {
        self.handlers.insert(suffix.into(), handler);
        self
    }

    /// Register a rejection handler for when a specific command is rejected.
    ///
    /// Called when a command this service issued against `domain` with the
    /// given type suffix comes back rejected.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// router.on_rejected("inventory", "ReserveStock", handle_reserve_rejected)
    /// ```
    pub fn on_rejected(
        mut self,
        domain: impl Into<String>,
        command: impl Into<String>,
        handler: RejectionHandler<S>,
    ) -> Self {
        let key = format!("{}/{}", domain.into(), command.into());
        self.rejection_handlers.insert(key, handler);
        self
    }

    /// Get the domain this router handles.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Get the list of registered command type suffixes.
    pub fn command_types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Get the list of registered rejection keys (`domain/command`).
    pub fn rejection_keys(&self) -> Vec<String> {
        self.rejection_handlers.keys().cloned().collect()
    }

    /// Rebuild state from an EventBook using the held state router.
    ///
    /// Used by replay paths to compute state from events without dispatching.
    pub fn rebuild_state(&self, event_book: &EventBook) -> Result<S, Status> {
        self.state.fold(event_book)
    }

    /// Dispatch a contextual command to the appropriate handler.
    ///
    /// Rejection notifications route to the rejection table; everything else
    /// passes the sequence gate, is handled, and has its output stamped. A
    /// sequence conflict or a business rejection yields a revocation
    /// response; shape violations and unknown command types are fatal.
    pub fn dispatch(&self, ctx: &ContextualCommand) -> Result<BusinessResponse, Status> {
        let command_book = ctx
            .command
            .as_ref()
            .ok_or_else(|| Status::invalid_argument("Missing command book"))?;

        if command_book.pages.len() != 1 {
            return Err(Status::invalid_argument(format!(
                "CommandBook must carry exactly one page, got {}",
                command_book.pages.len()
            )));
        }
        let command_page = &command_book.pages[0];

        let command_any = command_page
            .command
            .as_ref()
            .ok_or_else(|| Status::invalid_argument("Missing command payload"))?;

        let event_book = ctx
            .events
            .as_ref()
            .ok_or_else(|| Status::invalid_argument("Missing event book"))?;

        let suffix = type_suffix(&command_any.type_url);

        // Rejection notifications bypass the sequence gate; they compensate,
        // they do not contend for the head.
        if suffix == NOTIFICATION_SUFFIX {
            return self.dispatch_rejection(command_any, event_book);
        }

        let expected = next_sequence(Some(event_book));
        if command_page.sequence != expected {
            warn!(
                domain = %self.domain,
                suffix,
                declared = command_page.sequence,
                expected,
                "Stale command sequence"
            );
            return Ok(revocation(format!(
                "Sequence mismatch: command declares {} but the aggregate head expects {}",
                command_page.sequence, expected
            )));
        }

        let state = self.state.fold(event_book)?;

        let handler = self
            .handlers
            .get(suffix)
            .ok_or_else(|| Status::invalid_argument(format!("Unknown command type: {}", suffix)))?;

        debug!(domain = %self.domain, suffix, sequence = expected, "Dispatching command");

        match handler(command_book, command_any, &state, expected) {
            Ok(mut out) => {
                stamp_output(&mut out, command_book.cover.clone(), expected);
                Ok(BusinessResponse {
                    result: Some(business_response::Result::Events(out)),
                })
            }
            Err(rejected) => Ok(revocation(rejected.reason)),
        }
    }

    /// Route a rejection notification to the matching compensation handler.
    fn dispatch_rejection(
        &self,
        command_any: &Any,
        event_book: &EventBook,
    ) -> Result<BusinessResponse, Status> {
        let notification = Notification::decode(command_any.value.as_slice()).map_err(|e| {
            Status::invalid_argument(format!("Failed to decode Notification: {}", e))
        })?;

        let ctx = match CompensationContext::from_notification(notification) {
            Ok(ctx) => ctx,
            // Not a rejection payload; nothing for this router to do.
            Err(_) => return Ok(BusinessResponse::default()),
        };

        let key = format!("{}/{}", ctx.source_domain(), ctx.rejected_suffix());

        let Some(handler) = self.rejection_handlers.get(&key) else {
            debug!(
                domain = %self.domain,
                key = %key,
                reason = %ctx.rejection_reason(),
                "No compensation registered for rejected command"
            );
            return Ok(BusinessResponse::default());
        };

        let state = self.state.fold(event_book)?;
        let next_seq = next_sequence(Some(event_book));

        match handler(&ctx, &state) {
            Ok(RejectionOutput {
                events: Some(mut out),
                ..
            }) => {
                stamp_output(&mut out, event_book.cover().cloned(), next_seq);
                Ok(BusinessResponse {
                    result: Some(business_response::Result::Events(out)),
                })
            }
            Ok(RejectionOutput {
                notification: Some(n),
                ..
            }) => Ok(BusinessResponse {
                result: Some(business_response::Result::Notification(n)),
            }),
            Ok(_) => Ok(BusinessResponse::default()),
            Err(rejected) => Ok(revocation(rejected.reason)),
        }
    }
}

fn revocation(reason: String) -> BusinessResponse {
    BusinessResponse {
        result: Some(business_response::Result::Revocation(RevocationResponse {
            reason,
        })),
    }
}

/// Verify handler-returned sequences are contiguous from `next_seq`; rewrite
/// them when they are not, preserving handler order. The emitted book always
/// carries the input cover and a restamped `next_sequence`.
fn stamp_output(out: &mut EventBook, cover: Option<crate::proto::Cover>, next_seq: u32) {
    let contiguous = out
        .pages
        .iter()
        .enumerate()
        .all(|(i, p)| p.sequence == next_seq + i as u32);
    if !contiguous {
        for (i, page) in out.pages.iter_mut().enumerate() {
            page.sequence = next_seq + i as u32;
        }
    }
    out.cover = cover;
    out.next_sequence = next_seq + out.pages.len() as u32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{
        event_page, CommandPage, Cover, EventPage, IssuerType, MergeStrategy,
        RejectionNotification,
    };
    use crate::router::{new_event_book, new_event_book_multi, StateRouter};

    #[derive(Debug, Default, PartialEq, Clone)]
    struct Tally {
        total: i64,
    }

    fn apply_added(state: &mut Tally, event: prost_types::Duration) {
        state.total += event.seconds;
    }

    fn added_any(amount: i64) -> prost_types::Any {
        prost_types::Any {
            type_url: "type.googleapis.com/test.Added".to_string(),
            value: prost_types::Duration {
                seconds: amount,
                nanos: 0,
            }
            .encode_to_vec(),
        }
    }

    fn added_page(seq: u32, amount: i64) -> EventPage {
        EventPage {
            sequence: seq,
            created_at: None,
            payload: Some(event_page::Payload::Event(added_any(amount))),
        }
    }

    fn handle_add(
        book: &CommandBook,
        _cmd: &Any,
        _state: &Tally,
        seq: u32,
    ) -> CommandResult<EventBook> {
        Ok(new_event_book(book, seq, added_any(1)))
    }

    fn handle_add_two(
        book: &CommandBook,
        _cmd: &Any,
        _state: &Tally,
        seq: u32,
    ) -> CommandResult<EventBook> {
        Ok(new_event_book_multi(book, seq, vec![added_any(1), added_any(2)]))
    }

    fn handle_misnumbered(
        book: &CommandBook,
        _cmd: &Any,
        _state: &Tally,
        _seq: u32,
    ) -> CommandResult<EventBook> {
        // Deliberately wrong sequences; the router must rewrite them.
        Ok(new_event_book_multi(book, 99, vec![added_any(1), added_any(2)]))
    }

    fn handle_reject(
        book: &CommandBook,
        _cmd: &Any,
        state: &Tally,
        seq: u32,
    ) -> CommandResult<EventBook> {
        crate::validation::ensure(state.total < 0, "tally is closed")?;
        Ok(new_event_book(book, seq, added_any(0)))
    }

    fn router() -> CommandRouter<Tally> {
        let state = StateRouter::<Tally>::new().on::<prost_types::Duration>("Added", apply_added);
        CommandRouter::new("tally", state)
            .on("Add", handle_add)
            .on("AddTwo", handle_add_two)
            .on("AddMisnumbered", handle_misnumbered)
            .on("Close", handle_reject)
    }

    fn cover(domain: &str) -> Cover {
        Cover {
            domain: domain.to_string(),
            root: None,
            correlation_id: "corr-1".to_string(),
            edition: None,
        }
    }

    fn command_book(domain: &str, suffix: &str, seq: u32) -> CommandBook {
        CommandBook {
            cover: Some(cover(domain)),
            pages: vec![CommandPage {
                sequence: seq,
                command: Some(prost_types::Any {
                    type_url: format!("type.googleapis.com/test.{}", suffix),
                    value: vec![],
                }),
                merge_strategy: MergeStrategy::MergeStrict as i32,
            }],
        }
    }

    fn history(pages: Vec<EventPage>) -> EventBook {
        EventBook {
            cover: Some(cover("tally")),
            pages,
            ..Default::default()
        }
    }

    fn events_of(response: BusinessResponse) -> EventBook {
        match response.result {
            Some(business_response::Result::Events(book)) => book,
            other => panic!("expected events, got {:?}", other),
        }
    }

    fn revocation_of(response: BusinessResponse) -> RevocationResponse {
        match response.result {
            Some(business_response::Result::Revocation(r)) => r,
            other => panic!("expected revocation, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_happy_path() {
        let ctx = ContextualCommand {
            command: Some(command_book("tally", "Add", 2)),
            events: Some(history(vec![added_page(0, 1), added_page(1, 1)])),
        };
        let out = events_of(router().dispatch(&ctx).unwrap());
        assert_eq!(out.pages.len(), 1);
        assert_eq!(out.pages[0].sequence, 2);
        assert_eq!(out.cover.as_ref().unwrap().domain, "tally");
        assert_eq!(out.next_sequence, 3);
    }

    #[test]
    fn test_dispatch_stale_sequence_is_revoked() {
        let ctx = ContextualCommand {
            command: Some(command_book("tally", "Add", 1)),
            events: Some(history(vec![added_page(0, 1), added_page(1, 1)])),
        };
        let r = revocation_of(router().dispatch(&ctx).unwrap());
        assert!(r.reason.contains("Sequence mismatch"));
        assert!(r.reason.contains('1') && r.reason.contains('2'));
    }

    #[test]
    fn test_dispatch_unknown_command_type() {
        let ctx = ContextualCommand {
            command: Some(command_book("tally", "Foo", 0)),
            events: Some(history(vec![])),
        };
        let err = router().dispatch(&ctx).unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
        assert!(err.message().contains("Unknown command type: Foo"));
    }

    #[test]
    fn test_dispatch_suffix_must_match_exactly() {
        // `Addendum` must not route to the `Add` handler.
        let ctx = ContextualCommand {
            command: Some(command_book("tally", "Addendum", 0)),
            events: Some(history(vec![])),
        };
        let err = router().dispatch(&ctx).unwrap_err();
        assert!(err.message().contains("Unknown command type"));
    }

    #[test]
    fn test_dispatch_rejected_command_becomes_revocation() {
        let ctx = ContextualCommand {
            command: Some(command_book("tally", "Close", 0)),
            events: Some(history(vec![])),
        };
        let r = revocation_of(router().dispatch(&ctx).unwrap());
        assert_eq!(r.reason, "tally is closed");
    }

    #[test]
    fn test_dispatch_multi_event_stamping() {
        let ctx = ContextualCommand {
            command: Some(command_book("tally", "AddTwo", 3)),
            events: Some(history(vec![
                added_page(0, 1),
                added_page(1, 1),
                added_page(2, 1),
            ])),
        };
        let out = events_of(router().dispatch(&ctx).unwrap());
        let seqs: Vec<u32> = out.pages.iter().map(|p| p.sequence).collect();
        assert_eq!(seqs, vec![3, 4]);
    }

    #[test]
    fn test_dispatch_rewrites_misnumbered_handler_output() {
        let ctx = ContextualCommand {
            command: Some(command_book("tally", "AddMisnumbered", 0)),
            events: Some(history(vec![])),
        };
        let out = events_of(router().dispatch(&ctx).unwrap());
        let seqs: Vec<u32> = out.pages.iter().map(|p| p.sequence).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(out.next_sequence, 2);
    }

    #[test]
    fn test_dispatch_requires_exactly_one_page() {
        let mut book = command_book("tally", "Add", 0);
        book.pages.push(book.pages[0].clone());
        let ctx = ContextualCommand {
            command: Some(book),
            events: Some(history(vec![])),
        };
        let err = router().dispatch(&ctx).unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
        assert!(err.message().contains("exactly one page"));
    }

    #[test]
    fn test_dispatch_missing_books_are_fatal() {
        let err = router()
            .dispatch(&ContextualCommand {
                command: None,
                events: None,
            })
            .unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);

        let err = router()
            .dispatch(&ContextualCommand {
                command: Some(command_book("tally", "Add", 0)),
                events: None,
            })
            .unwrap_err();
        assert!(err.message().contains("Missing event book"));
    }

    fn rejection_command(domain: &str, suffix: &str) -> CommandBook {
        let rejected = command_book(domain, suffix, 4);
        let rejection = RejectionNotification {
            rejection_reason: "out of stock".to_string(),
            rejected_command: Some(rejected),
            issuer_name: "saga-fulfillment".to_string(),
            issuer_type: IssuerType::IssuerSaga as i32,
            source_aggregate: Some(cover(domain)),
            source_event_sequence: 7,
        };
        let notification = Notification {
            cover: Some(cover("tally")),
            sent_at: None,
            payload: Some(prost_types::Any {
                type_url: "type.googleapis.com/angzarr.RejectionNotification".to_string(),
                value: rejection.encode_to_vec(),
            }),
        };
        CommandBook {
            cover: Some(cover("tally")),
            pages: vec![CommandPage {
                sequence: 0,
                command: Some(prost_types::Any {
                    type_url: "type.googleapis.com/angzarr.Notification".to_string(),
                    value: notification.encode_to_vec(),
                }),
                merge_strategy: MergeStrategy::MergeStrict as i32,
            }],
        }
    }

    fn handle_reserve_rejected(
        ctx: &CompensationContext,
        _state: &Tally,
    ) -> CommandResult<RejectionOutput> {
        assert_eq!(ctx.rejection_reason(), "out of stock");
        let book = EventBook {
            pages: vec![added_page(0, -1)],
            ..Default::default()
        };
        Ok(RejectionOutput::events(book))
    }

    #[test]
    fn test_rejection_routes_to_registered_handler() {
        let r = router().on_rejected("inventory", "ReserveStock", handle_reserve_rejected);
        let ctx = ContextualCommand {
            command: Some(rejection_command("inventory", "ReserveStock")),
            events: Some(history(vec![added_page(0, 1)])),
        };
        let out = events_of(r.dispatch(&ctx).unwrap());
        assert_eq!(out.pages.len(), 1);
        // Compensation events continue the issuer's own history.
        assert_eq!(out.pages[0].sequence, 1);
        assert_eq!(out.cover.as_ref().unwrap().domain, "tally");
    }

    #[test]
    fn test_rejection_without_handler_is_empty_response() {
        let ctx = ContextualCommand {
            command: Some(rejection_command("inventory", "ReserveStock")),
            events: Some(history(vec![])),
        };
        let response = router().dispatch(&ctx).unwrap();
        assert!(response.result.is_none());
    }

    #[test]
    fn test_rejection_skips_sequence_gate() {
        // The notification page declares sequence 0 while the head is at 1;
        // compensation must still run.
        let r = router().on_rejected("inventory", "ReserveStock", handle_reserve_rejected);
        let ctx = ContextualCommand {
            command: Some(rejection_command("inventory", "ReserveStock")),
            events: Some(history(vec![added_page(0, 1)])),
        };
        assert!(r.dispatch(&ctx).unwrap().result.is_some());
    }

    #[test]
    fn test_malformed_notification_is_fatal() {
        let mut book = rejection_command("inventory", "ReserveStock");
        book.pages[0].command.as_mut().unwrap().value = vec![0xff, 0xff, 0xff];
        let ctx = ContextualCommand {
            command: Some(book),
            events: Some(history(vec![])),
        };
        let err = router().dispatch(&ctx).unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn test_introspection() {
        let r = router().on_rejected("inventory", "ReserveStock", handle_reserve_rejected);
        assert_eq!(r.domain(), "tally");
        let mut types = r.command_types();
        types.sort();
        assert_eq!(types, vec!["Add", "AddMisnumbered", "AddTwo", "Close"]);
        assert_eq!(r.rejection_keys(), vec!["inventory/ReserveStock"]);
    }
}
