//! Conversion helpers for wire types.

use crate::error::{CoreError, Result};
use crate::proto::Uuid as ProtoUuid;
use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use uuid::Uuid;

/// Default type URL prefix for protocol buffer messages.
pub const TYPE_URL_PREFIX: &str = "type.googleapis.com";

/// Build a fully-qualified type URL from a message type name.
///
/// # Examples
/// ```
/// use angzarr_core::convert::type_url;
/// assert_eq!(type_url("orders.v1.OrderCreated"), "type.googleapis.com/orders.v1.OrderCreated");
/// ```
pub fn type_url(type_name: &str) -> String {
    format!("{}/{}", TYPE_URL_PREFIX, type_name)
}

/// Extract the type name from a type URL.
///
/// Returns the part after the last `/`, or the whole string if no `/` present.
pub fn type_name_from_url(type_url: &str) -> &str {
    type_url.rsplit('/').next().unwrap_or(type_url)
}

/// Extract the routing suffix from a type URL.
///
/// The suffix is the substring after the final `.` or `/`, whichever comes
/// later. All router keys are suffixes, matched by exact equality: `Foo`
/// matches `a.b.c.Foo`, `x/y/Foo`, and `Foo`, and never `Foober`.
///
/// # Examples
/// ```
/// use angzarr_core::convert::type_suffix;
/// assert_eq!(type_suffix("type.googleapis.com/orders.v1.OrderCreated"), "OrderCreated");
/// assert_eq!(type_suffix("type.poker/examples.CardsDealt"), "CardsDealt");
/// assert_eq!(type_suffix("OrderCreated"), "OrderCreated");
/// ```
pub fn type_suffix(type_url: &str) -> &str {
    match type_url.rfind(['.', '/']) {
        Some(idx) => &type_url[idx + 1..],
        None => type_url,
    }
}

/// Convert a UUID to its wire representation.
pub fn uuid_to_proto(uuid: Uuid) -> ProtoUuid {
    ProtoUuid {
        value: uuid.as_bytes().to_vec(),
    }
}

/// Convert a wire UUID to a standard UUID.
pub fn proto_to_uuid(proto: &ProtoUuid) -> Result<Uuid> {
    Uuid::from_slice(&proto.value)
        .map_err(|e| CoreError::InvalidArgument(format!("invalid UUID: {}", e)))
}

/// Parse an RFC3339 timestamp string into a wire Timestamp.
///
/// # Examples
/// ```
/// use angzarr_core::convert::parse_timestamp;
/// let ts = parse_timestamp("2024-01-15T10:30:00Z").unwrap();
/// assert_eq!(ts.seconds, 1705314600);
/// ```
pub fn parse_timestamp(rfc3339: &str) -> Result<Timestamp> {
    let dt: DateTime<Utc> = rfc3339
        .parse()
        .map_err(|e| CoreError::InvalidTimestamp(format!("{}: {}", rfc3339, e)))?;

    Ok(Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    })
}

/// Get the current time as a wire Timestamp.
pub fn now() -> Timestamp {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before unix epoch");

    Timestamp {
        seconds: now.as_secs() as i64,
        nanos: now.subsec_nanos() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_url() {
        assert_eq!(
            type_url("orders.v1.OrderCreated"),
            "type.googleapis.com/orders.v1.OrderCreated"
        );
    }

    #[test]
    fn test_type_name_from_url() {
        assert_eq!(
            type_name_from_url("type.googleapis.com/orders.v1.OrderCreated"),
            "orders.v1.OrderCreated"
        );
        assert_eq!(type_name_from_url("OrderCreated"), "OrderCreated");
    }

    #[test]
    fn test_type_suffix_dotted() {
        assert_eq!(
            type_suffix("type.googleapis.com/orders.v1.OrderCreated"),
            "OrderCreated"
        );
    }

    #[test]
    fn test_type_suffix_slash_only() {
        assert_eq!(type_suffix("x/y/Foo"), "Foo");
    }

    #[test]
    fn test_type_suffix_bare() {
        assert_eq!(type_suffix("Foo"), "Foo");
    }

    #[test]
    fn test_type_suffix_is_not_ends_with() {
        // Suffix extraction must not confuse `Foober` with `Foo`.
        assert_ne!(type_suffix("a.b.Foober"), "Foo");
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let proto = uuid_to_proto(uuid);
        let back = proto_to_uuid(&proto).unwrap();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_uuid_conversion_invalid_length() {
        let proto = ProtoUuid {
            value: vec![1, 2, 3],
        };
        assert!(proto_to_uuid(&proto).is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(ts.seconds, 1705314600);
        assert_eq!(ts.nanos, 0);
    }

    #[test]
    fn test_parse_timestamp_with_nanos() {
        let ts = parse_timestamp("2024-01-15T10:30:00.123456789Z").unwrap();
        assert_eq!(ts.seconds, 1705314600);
        assert_eq!(ts.nanos, 123456789);
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        let err = parse_timestamp("not a timestamp").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimestamp(_)));
    }
}
