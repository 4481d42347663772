// Misc aliases and helpers for interface
// Locks, shared pointers, serialization

pub use std::sync::Arc as RustRfc;

pub use parking_lot::RwLock as RustLock;
pub use parking_lot::{RwLockReadGuard as RustLockReadGuard, RwLockWriteGuard as RustLockWriteGuard};

pub use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

pub fn serde_serialize_to_bytes<T: SerdeSerialize>(obj: &T) -> Result<Vec<u8>, serde_cbor::Error> {
    serde_cbor::to_vec(obj)
}

pub fn serde_deserialize_from_bytes<T: for<'de> SerdeDeserialize<'de>>(bytes: &[u8]) -> Result<T, serde_cbor::Error> {
    serde_cbor::from_slice(bytes)
}
