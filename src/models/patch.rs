use serde::{Deserialize, Deserializer};

/// Presence-aware field for partial updates.
///
/// A plain `Option<T>` cannot tell an absent field from an explicit `null`,
/// and a default value would swallow a legitimate `false` or `""`.
/// Use with `#[serde(default)]` so absent fields become `Missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_supplied(&self) -> bool {
        matches!(self, Patch::Value(_))
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}
