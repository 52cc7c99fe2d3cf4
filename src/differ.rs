use std::collections::VecDeque;

use crate::key::{KeyMap, TrackKey};

/// One step of turning the previous collection into the current one.
///
/// Operations are applied in order to a list that starts out as the previous collection.
/// Indexes refer to that list as it is when the operation runs, so after the last operation
/// position `i` holds the item at `i` in the current collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Insert { current_index: usize },
    Remove { adjusted_previous_index: usize },
    Move {
        adjusted_previous_index: usize,
        current_index: usize,
    },
}

/// The result of a non-empty diff.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IterableChanges {
    pub operations: Vec<Operation>,
    /// Current indexes of items whose key was kept but whose value changed.
    pub identity_changes: Vec<usize>,
}

impl IterableChanges {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.identity_changes.is_empty()
    }
}

/// Diffs successive collections by track-by key.
///
/// Items with equal keys are considered the same item (their views are kept or moved); among
/// duplicate keys, earlier previous items pair with earlier current items.
#[derive(Clone, Debug)]
pub struct IterableDiffer<T, K> {
    keys: Vec<K>,
    items: Vec<T>,
}

impl<T, K> Default for IterableDiffer<T, K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            items: Vec::new(),
        }
    }
}

const NEW_ITEM: usize = usize::MAX;

impl<T: Clone + PartialEq, K: TrackKey> IterableDiffer<T, K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items in the collection seen by the last diff.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares `items` to the previous collection and remembers `items` for the next call.
    ///
    /// Returns `None` when nothing changed.
    pub fn diff(
        &mut self,
        items: &[T],
        track_by: &dyn Fn(usize, &T) -> K,
    ) -> Option<IterableChanges> {
        let keys: Vec<K> = items
            .iter()
            .enumerate()
            .map(|(i, item)| track_by(i, item))
            .collect();

        let mut unmatched: KeyMap<&K, VecDeque<usize>> = KeyMap::default();
        for (i, key) in self.keys.iter().enumerate() {
            unmatched.entry(key).or_default().push_back(i);
        }
        let matched: Vec<Option<usize>> = keys
            .iter()
            .map(|key| unmatched.get_mut(key).and_then(VecDeque::pop_front))
            .collect();
        drop(unmatched);

        let mut changes = IterableChanges::default();
        let mut kept = vec![false; self.keys.len()];
        for previous in matched.iter().flatten() {
            kept[*previous] = true;
        }

        // Removals go back to front so every index is still the previous index.
        let mut work: Vec<usize> = (0..self.keys.len()).collect();
        for previous in (0..self.keys.len()).rev() {
            if !kept[previous] {
                work.remove(previous);
                changes.operations.push(Operation::Remove {
                    adjusted_previous_index: previous,
                });
            }
        }

        for (current, previous) in matched.iter().enumerate() {
            match previous {
                Some(previous) => {
                    // Slots before `current` are final, so the item is at or after it.
                    let at = work[current..]
                        .iter()
                        .position(|w| w == previous)
                        .map(|p| p + current)
                        .unwrap_or(current);
                    if at != current {
                        let moved = work.remove(at);
                        work.insert(current, moved);
                        changes.operations.push(Operation::Move {
                            adjusted_previous_index: at,
                            current_index: current,
                        });
                    }
                    if self.items[*previous] != items[current] {
                        changes.identity_changes.push(current);
                    }
                }
                None => {
                    work.insert(current, NEW_ITEM);
                    changes.operations.push(Operation::Insert {
                        current_index: current,
                    });
                }
            }
        }
        debug_assert_eq!(work.len(), items.len());

        self.keys = keys;
        self.items = items.to_vec();

        if changes.is_empty() {
            None
        } else {
            vtrace!(
                operations = changes.operations.len(),
                identity_changes = changes.identity_changes.len(),
                "IterableDiffer::diff"
            );
            Some(changes)
        }
    }
}
