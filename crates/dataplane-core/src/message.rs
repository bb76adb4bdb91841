//! Deep-copy primitive for messages crossing an in-process call boundary.
//!
//! `Clone` is not enough on its own: `Arc` and `Bytes` clones share their
//! allocation with the original. `DeepClone` always produces a value that
//! shares no memory with its source, recursively.

use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

/// Produce an independent copy with no shared substructure.
pub trait DeepClone: Sized {
    fn deep_clone(&self) -> Self;
}

/// Marker for values that may cross the client/server boundary.
pub trait Message: DeepClone + Send + Sync + 'static {}

impl<T: DeepClone + Send + Sync + 'static> Message for T {}

macro_rules! deep_clone_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepClone for $ty {
                #[inline]
                fn deep_clone(&self) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

deep_clone_by_value!(
    bool,
    u8,
    u16,
    u32,
    u64,
    i8,
    i16,
    i32,
    i64,
    f32,
    f64,
    usize,
    String,
    serde_json::Value,
);

impl DeepClone for () {
    fn deep_clone(&self) -> Self {}
}

impl DeepClone for Bytes {
    fn deep_clone(&self) -> Self {
        Bytes::copy_from_slice(self)
    }
}

impl DeepClone for serde_json::Map<String, serde_json::Value> {
    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: DeepClone> DeepClone for Vec<T> {
    fn deep_clone(&self) -> Self {
        self.iter().map(DeepClone::deep_clone).collect()
    }
}

impl<T: DeepClone> DeepClone for Option<T> {
    fn deep_clone(&self) -> Self {
        self.as_ref().map(DeepClone::deep_clone)
    }
}

impl<T: DeepClone> DeepClone for Box<T> {
    fn deep_clone(&self) -> Self {
        Box::new((**self).deep_clone())
    }
}

impl<T: DeepClone> DeepClone for Arc<T> {
    fn deep_clone(&self) -> Self {
        Arc::new((**self).deep_clone())
    }
}

impl<K: Ord + DeepClone, V: DeepClone> DeepClone for BTreeMap<K, V> {
    fn deep_clone(&self) -> Self {
        self.iter()
            .map(|(k, v)| (k.deep_clone(), v.deep_clone()))
            .collect()
    }
}

impl<K: Eq + Hash + DeepClone, V: DeepClone> DeepClone for HashMap<K, V> {
    fn deep_clone(&self) -> Self {
        self.iter()
            .map(|(k, v)| (k.deep_clone(), v.deep_clone()))
            .collect()
    }
}
