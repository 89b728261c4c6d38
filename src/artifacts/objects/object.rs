use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::BufRead;

/// Canonical byte form of an object, including the `<type> <size>\0` header
pub trait Packable {
    fn serialize(&self) -> Bytes;
}

/// Rebuild an object from its payload (the header has already been read)
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self, String>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> ObjectId {
        let mut hasher = Sha256::new();
        hasher.update(self.serialize());

        let digest: [u8; 32] = hasher.finalize().into();
        ObjectId::from_digest(digest)
    }
}

/// Prefix `payload` with the object header
pub(crate) fn with_header(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let mut object_bytes = format!("{} {}\0", object_type.as_str(), payload.len()).into_bytes();
    object_bytes.extend_from_slice(payload);
    Bytes::from(object_bytes)
}
