//! JSON envelopes
//!
//! Every GoodData resource travels wrapped in a single-key object named after
//! the resource, e.g. `{"project": {...}}`. [`Envelope`] adds and strips that
//! wrapper for any type implementing [`Resource`].

use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A resource with a named JSON envelope.
pub trait Resource: Serialize + DeserializeOwned {
    /// The key wrapping the resource on the wire.
    const ROOT: &'static str;
}

/// A resource that is also returned in collections.
pub trait Listed: Resource {
    /// The key wrapping the collection on the wire.
    const COLLECTION: &'static str;
}

/// A resource together with its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T>(pub T);

impl<T> Envelope<T> {
    /// Strip the envelope.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Envelope<T> {
    fn from(value: T) -> Self {
        Envelope(value)
    }
}

impl<T: Resource> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(T::ROOT, &self.0)?;
        map.end()
    }
}

impl<'de, T: Resource> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_keyed::<D, T>(deserializer, T::ROOT).map(Envelope)
    }
}

/// Deserialize the value stored under `key` in a JSON object, ignoring any
/// sibling keys.
pub(crate) fn deserialize_keyed<'de, D, V>(deserializer: D, key: &'static str) -> Result<V, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct KeyedVisitor<V> {
        key: &'static str,
        marker: PhantomData<V>,
    }

    impl<'de, V: Deserialize<'de>> Visitor<'de> for KeyedVisitor<V> {
        type Value = V;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "an object with a `{}` key", self.key)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<V, A::Error> {
            let mut value = None;
            while let Some(name) = map.next_key::<String>()? {
                if name == self.key {
                    if value.is_some() {
                        return Err(de::Error::duplicate_field(self.key));
                    }
                    value = Some(map.next_value::<V>()?);
                } else {
                    map.next_value::<de::IgnoredAny>()?;
                }
            }
            value.ok_or_else(|| de::Error::missing_field(self.key))
        }
    }

    deserializer.deserialize_map(KeyedVisitor {
        key,
        marker: PhantomData,
    })
}
