//! Constants shared across the proto extensions.

/// Fallback domain when a cover is missing or has no domain set.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Default edition name for the main timeline.
///
/// The canonical timeline is named "angzarr". Empty edition names are treated
/// as equivalent to this value.
pub const DEFAULT_EDITION: &str = "angzarr";

/// Type suffix of the notification wrapper carrying rejection payloads.
pub const NOTIFICATION_SUFFIX: &str = "Notification";
