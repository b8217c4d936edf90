//! Tri-state update field.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field in a partial update.
///
/// Distinguishes "leave the stored value alone" from "clear the stored value"
/// from "replace the stored value". When deserialized inside a struct marked
/// `#[serde(default)]`, a missing key is [`Field::Unset`] and an explicit
/// `null` is [`Field::Null`].
///
/// Both `Unset` and `Null` serialize as `null`. Containers that must
/// round-trip mark the field `#[serde(skip_serializing_if = "Field::is_unset")]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Apply the update to a nullable slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Self::Unset => {}
            Self::Null => *slot = None,
            Self::Value(v) => *slot = Some(v),
        }
    }

    /// The value a slot currently holding `current` would hold after applying.
    pub fn resolve(&self, current: Option<&T>) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Self::Unset => current.cloned(),
            Self::Null => None,
            Self::Value(v) => Some(v.clone()),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset | Self::Null => serializer.serialize_none(),
            Self::Value(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}
