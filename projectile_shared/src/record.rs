//! Persisted entity records.
//!
//! A record is a string-keyed map, the same shape save files use for entity
//! data. Vectors are stored as arrays of single-precision floats.
//!
//! Decoding is lenient: a missing or malformed vector reads as zero and is
//! logged, so one damaged entry does not stop a world from loading.

use serde_json::{Map, Value};
use tracing::warn;

use crate::math::Vec3;

/// Structured entity record.
pub type Record = Map<String, Value>;

/// Key of the position vector.
pub const POS: &str = "Pos";
/// Key of the velocity vector.
pub const MOTION: &str = "Motion";
/// Key of `[yaw, pitch]`.
pub const ROTATION: &str = "Rotation";

/// Stores `values` under `key` as a float array.
pub fn put_f32s(record: &mut Record, key: &str, values: &[f32]) {
    record.insert(
        key.to_string(),
        Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
    );
}

/// Reads an `N`-element float array, or `None` if absent or malformed.
pub fn f32s<const N: usize>(record: &Record, key: &str) -> Option<[f32; N]> {
    let items = record.get(key)?.as_array()?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()? as f32;
    }
    Some(out)
}

pub fn put_vec3(record: &mut Record, key: &str, v: Vec3) {
    put_f32s(record, key, &v.to_f32_array());
}

/// Reads a vector, falling back to zero.
pub fn vec3_or_zero(record: &Record, key: &str) -> Vec3 {
    match f32s::<3>(record, key) {
        Some(v) if v.iter().all(|c| c.is_finite()) => Vec3::from(v),
        _ => {
            if record.contains_key(key) {
                warn!(key, value = ?record.get(key), "malformed vector in record, using zero");
            } else {
                warn!(key, "missing vector in record, using zero");
            }
            Vec3::ZERO
        }
    }
}
