use std::collections::HashMap;

/// One scheduled entry: an ordering key, the unique identifier assigned by the owning queue, and the payload.
///
/// Entries sort ascending by `(key, id)`. Because identifiers are handed out in strictly increasing order, the
/// identifier both breaks ties among equal keys and serves as the handle for [`IndexedHeap::remove()`].
#[derive(Debug)]
pub(crate) struct Entry<Key, Value> {
    pub key: Key,
    pub id: u64,
    pub value: Value,
}

/// Array-backed binary min-heap augmented with an id-to-position index.
///
/// The index makes removal of an arbitrary entry O(log n) rather than O(n), which is what lets a simulation cancel a
/// pending event - or a condition drop a pending waiter - without scanning. The index is kept consistent with every
/// swap the heap performs while restoring its shape, and the two collections must agree on their length at every
/// observation point; disagreement means the structure can no longer be trusted and is treated as fatal.
///
/// The same structure backs both the simulation's time-ordered queue (`Key = Time`) and a condition's
/// registration-ordered queue (`Key = ()`, so ordering degenerates to insertion order).
pub(crate) struct IndexedHeap<Key, Value>
where
    Key: Ord,
{
    entries: Vec<Entry<Key, Value>>,
    index_of: HashMap<u64, usize>,
}

impl<Key, Value> IndexedHeap<Key, Value>
where
    Key: Ord,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index_of: HashMap::new(),
        }
    }

    /// Current entry count.
    ///
    /// # Panics
    ///
    /// Panics if the heap and its id index have diverged in size, as that indicates an internal bug that must not be
    /// silently tolerated.
    pub fn len(&self) -> usize {
        assert_eq!(
            self.entries.len(),
            self.index_of.len(),
            "heap length diverged from its id index",
        );
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert an entry under a caller-assigned unique id.
    ///
    /// # Panics
    ///
    /// Panics if an entry with the same id is already present. Ids are assigned from monotonically increasing
    /// counters, so a duplicate can only come from an id-generation bug.
    pub fn push(&mut self, id: u64, key: Key, value: Value) {
        if self.index_of.contains_key(&id) {
            panic!("entry with id {id} already present in heap");
        }
        self.entries.push(Entry { key, id, value });
        let position = self.entries.len() - 1;
        self.index_of.insert(id, position);
        self.sift_up(position);
    }

    /// Shared reference to the entry with the smallest `(key, id)`.
    ///
    /// # Panics
    ///
    /// Panics on an empty heap; callers must check [`len()`] or [`is_empty()`] first.
    ///
    /// [`len()`]: IndexedHeap::len
    /// [`is_empty()`]: IndexedHeap::is_empty
    pub fn peek(&self) -> &Entry<Key, Value> {
        self.entries.first().expect("peek on an empty heap")
    }

    /// Remove and return the entry with the smallest `(key, id)`.
    ///
    /// # Panics
    ///
    /// Panics on an empty heap; callers must check [`len()`] or [`is_empty()`] first.
    ///
    /// [`len()`]: IndexedHeap::len
    /// [`is_empty()`]: IndexedHeap::is_empty
    pub fn pop(&mut self) -> Entry<Key, Value> {
        assert!(!self.entries.is_empty(), "pop on an empty heap");
        self.remove_at(0)
    }

    /// Remove the entry with the given id wherever it sits in the heap, restoring the heap property afterward.
    ///
    /// Returns `None` when no entry carries the id - a normal outcome for an entry that already executed or was
    /// previously removed.
    pub fn remove(&mut self, id: u64) -> Option<Entry<Key, Value>> {
        let position = *self.index_of.get(&id)?;
        Some(self.remove_at(position))
    }

    fn remove_at(&mut self, position: usize) -> Entry<Key, Value> {
        let last = self.entries.len() - 1;
        self.entries.swap(position, last);
        let entry = self.entries.pop().expect("heap is non-empty here");
        self.index_of.remove(&entry.id);
        if position < self.entries.len() {
            // The former tail entry landed at `position`; it may violate the heap property in either direction.
            self.index_of.insert(self.entries[position].id, position);
            self.sift_down(position);
            self.sift_up(position);
        }
        entry
    }

    fn precedes(&self, left: usize, right: usize) -> bool {
        let a = &self.entries[left];
        let b = &self.entries[right];
        (&a.key, a.id) < (&b.key, b.id)
    }

    /// Swap two entries and keep the id index pointing at their new slots.
    fn swap_entries(&mut self, left: usize, right: usize) {
        self.entries.swap(left, right);
        self.index_of.insert(self.entries[left].id, left);
        self.index_of.insert(self.entries[right].id, right);
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.precedes(position, parent) {
                break;
            }
            self.swap_entries(position, parent);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut smallest = position;
            if left < self.entries.len() && self.precedes(left, smallest) {
                smallest = left;
            }
            if right < self.entries.len() && self.precedes(right, smallest) {
                smallest = right;
            }
            if smallest == position {
                break;
            }
            self.swap_entries(position, smallest);
            position = smallest;
        }
    }
}

impl<Key, Value> Default for IndexedHeap<Key, Value>
where
    Key: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}
