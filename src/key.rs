use std::collections::HashMap;

/// Maps track-by keys to the values the differ needs per key.
pub(crate) type KeyMap<K, V> = HashMap<K, V>;

/// Bound for identity keys produced by a track-by function.
pub trait TrackKey: std::hash::Hash + Eq + Clone {}
impl<K: std::hash::Hash + Eq + Clone> TrackKey for K {}
