//! Deserialization helpers absorbing the backend's inconsistent encodings.

use serde::{Deserialize, Deserializer};

use crate::Time;

/// The backend encodes "no parent" as either `null`, a missing field or `0`
pub fn zero_as_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<u64>,
{
    Ok(Option::<u64>::deserialize(d)?
        .filter(|id| *id != 0)
        .map(T::from))
}

/// Empty slices and unset fields come over as `null` rather than being omitted
pub fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Timestamps that fail to parse are dropped rather than failing the whole record
pub fn lenient_time<'de, D>(d: D) -> Result<Option<Time>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|s| match s.parse::<Time>() {
        Ok(t) => Some(t),
        Err(err) => {
            tracing::debug!(?err, raw = %s, "ignoring unparseable timestamp");
            None
        }
    }))
}
