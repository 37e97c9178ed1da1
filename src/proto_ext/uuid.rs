//! UUID conversion traits between wire and standard representations.

use crate::proto::Uuid as ProtoUuid;

/// Extension trait for the wire UUID type.
pub trait ProtoUuidExt {
    /// Convert to a standard UUID. Fails when the value is not 16 bytes.
    fn to_uuid(&self) -> Result<uuid::Uuid, uuid::Error>;

    /// Render the raw bytes as lowercase hex.
    fn to_hex(&self) -> String;
}

impl ProtoUuidExt for ProtoUuid {
    fn to_uuid(&self) -> Result<uuid::Uuid, uuid::Error> {
        uuid::Uuid::from_slice(&self.value)
    }

    fn to_hex(&self) -> String {
        hex::encode(&self.value)
    }
}

/// Extension trait for standard UUIDs.
pub trait UuidExt {
    /// Convert to the wire representation.
    fn to_proto_uuid(&self) -> ProtoUuid;
}

impl UuidExt for uuid::Uuid {
    fn to_proto_uuid(&self) -> ProtoUuid {
        ProtoUuid {
            value: self.as_bytes().to_vec(),
        }
    }
}
