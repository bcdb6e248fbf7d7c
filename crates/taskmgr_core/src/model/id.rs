//! Task identifier generation.

use uuid::Uuid;

/// Opaque task identifier.
///
/// Generated ids are UUIDv7 strings, but imported collections may carry any
/// non-empty string, so the type stays a plain `String`.
pub type TaskId = String;

/// Produces a fresh task identifier.
///
/// UUIDv7 packs a millisecond timestamp prefix with 74 random bits, so ids
/// created within the same millisecond still collide only with negligible
/// probability. No global counter is kept.
pub fn next_id() -> TaskId {
    Uuid::now_v7().to_string()
}
