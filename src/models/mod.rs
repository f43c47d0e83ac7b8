mod item;
mod list;

pub use item::{Item, ItemPatch, NewItem};
pub use list::{List, ListPatch, ListWithItems, NewList};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer};

/// Current time at millisecond precision.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Generates a new opaque record id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
