//! Structured access to rejection notifications.
//!
//! A rejection arrives as a command book whose single page carries an `Any`
//! of `Notification`, whose payload is a `RejectionNotification`. That is a
//! two-level unpack: [`rejection_from_any`] performs it without errors;
//! [`CompensationContext`] validates it and exposes the issuer chain.

use prost::Message;
use prost_types::Any;
use tonic::Status;

use crate::convert::type_suffix;
use crate::proto::{CommandBook, Cover, IssuerType, Notification, RejectionNotification};
use crate::proto_ext::{CommandPageExt, CoverExt, NOTIFICATION_SUFFIX};

/// Unpack `Any -> Notification -> RejectionNotification`.
///
/// Returns `None` on any shape mismatch: wrong suffix, undecodable
/// notification, missing payload, or a payload of another type.
pub fn rejection_from_any(any: &Any) -> Option<RejectionNotification> {
    if type_suffix(&any.type_url) != NOTIFICATION_SUFFIX {
        return None;
    }
    let notification = Notification::decode(any.value.as_slice()).ok()?;
    rejection_payload(&notification)
}

fn rejection_payload(notification: &Notification) -> Option<RejectionNotification> {
    let payload = notification.payload.as_ref()?;
    if type_suffix(&payload.type_url) != "RejectionNotification" {
        return None;
    }
    RejectionNotification::decode(payload.value.as_slice()).ok()
}

/// Parsed rejection of a previously issued command.
///
/// Construction fails when the notification payload is not a
/// `RejectionNotification` or the rejected command is absent. When the
/// rejected command was itself a compensation, the outer rejection embeds the
/// inner one; [`inner`](CompensationContext::inner) walks the chain without
/// the caller decoding anything.
#[derive(Debug)]
pub struct CompensationContext {
    rejection: RejectionNotification,
    rejected_command: CommandBook,
}

impl CompensationContext {
    /// Build a context from a notification.
    pub fn from_notification(notification: Notification) -> Result<Self, Status> {
        let rejection = rejection_payload(&notification).ok_or_else(|| {
            Status::invalid_argument("Notification payload is not a RejectionNotification")
        })?;
        Self::from_rejection(rejection)
    }

    /// Build a context from an `Any` carrying a notification.
    pub fn from_any(any: &Any) -> Result<Self, Status> {
        let notification = Notification::decode(any.value.as_slice()).map_err(|e| {
            Status::invalid_argument(format!("Failed to decode Notification: {}", e))
        })?;
        Self::from_notification(notification)
    }

    fn from_rejection(rejection: RejectionNotification) -> Result<Self, Status> {
        let rejected_command = rejection
            .rejected_command
            .clone()
            .ok_or_else(|| Status::invalid_argument("RejectionNotification has no command"))?;
        Ok(Self {
            rejection,
            rejected_command,
        })
    }

    /// The command that was rejected.
    pub fn rejected_command(&self) -> &CommandBook {
        &self.rejected_command
    }

    /// Why the command was rejected.
    pub fn rejection_reason(&self) -> &str {
        &self.rejection.rejection_reason
    }

    /// Name of the component that issued the rejected command.
    pub fn issuer_name(&self) -> &str {
        &self.rejection.issuer_name
    }

    /// Role of the component that issued the rejected command.
    pub fn issuer_type(&self) -> IssuerType {
        IssuerType::try_from(self.rejection.issuer_type).unwrap_or(IssuerType::IssuerSaga)
    }

    /// Cover of the aggregate that rejected the command, when reported.
    pub fn source_aggregate(&self) -> Option<&Cover> {
        self.rejection.source_aggregate.as_ref()
    }

    /// Sequence of the event that triggered the rejected command.
    pub fn source_event_sequence(&self) -> u32 {
        self.rejection.source_event_sequence
    }

    /// Correlation id, derived from the rejected command's cover.
    pub fn correlation_id(&self) -> &str {
        self.rejected_command.correlation_id()
    }

    /// Domain that rejected the command: the reported source aggregate,
    /// falling back to the rejected command's cover.
    pub fn source_domain(&self) -> &str {
        self.source_aggregate()
            .map(|c| c.domain.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.rejected_command.domain())
    }

    /// Routing suffix of the rejected command's payload.
    pub fn rejected_suffix(&self) -> &str {
        self.rejected_command
            .pages
            .first()
            .and_then(|p| p.suffix())
            .unwrap_or("")
    }

    /// The next rejection in the issuer chain.
    ///
    /// Returns `Some` when the rejected command was itself a rejection
    /// notification (a compensation that failed).
    pub fn inner(&self) -> Option<CompensationContext> {
        let page = self.rejected_command.pages.first()?;
        let any = page.command.as_ref()?;
        let rejection = rejection_from_any(any)?;
        Self::from_rejection(rejection).ok()
    }

    /// Depth of the issuer chain, this context included.
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut current = self.inner();
        while let Some(ctx) = current {
            len += 1;
            current = ctx.inner();
        }
        len
    }
}
