//! HashTable: chained `i64 -> u32` map over a slot arena.
//!
//! Entries live in a `SlotMap`; each bucket holds the key of its chain head
//! and each entry holds the key of the next entry in the same bucket. The
//! arena owns every entry, so unlinking never leaves dangling references and
//! a resize relinks entries without moving or copying them.

use crate::error::TableError;
use crate::hash64::bucket_index;
use slotmap::{new_key_type, SlotMap};

/// Growth is triggered before an insert that would push `len / capacity` past this.
pub const MAX_LOAD_FACTOR: f64 = 0.75;

// SlotMap indexes with u32 and reserves one slot value.
const MAX_ENTRIES: usize = (u32::MAX - 1) as usize;

new_key_type! {
    struct EntryKey;
}

#[derive(Debug)]
struct Entry {
    key: i64,
    value: u32,
    next: Option<EntryKey>,
}

/// Outcome of a successful [`HashTable::put`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Put {
    Inserted,
    Updated { previous: u32 },
}

#[derive(Debug)]
pub struct HashTable {
    buckets: Vec<Option<EntryKey>>,
    slots: SlotMap<EntryKey, Entry>,
    failed_resizes: u64,
}

fn alloc_buckets(capacity: usize) -> Result<Vec<Option<EntryKey>>, TableError> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(|_| TableError::BucketAllocation { capacity })?;
    buckets.resize(capacity, None);
    Ok(buckets)
}

/// Iterator over `(key, value)` pairs of a `HashTable`, in no particular order.
pub struct Iter<'a> {
    it: slotmap::basic::Iter<'a, EntryKey, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (i64, u32);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl HashTable {
    /// Creates a table with `capacity` empty buckets.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        Ok(Self {
            buckets: alloc_buckets(capacity)?,
            slots: SlotMap::with_key(),
            failed_resizes: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Number of growth attempts abandoned because the larger bucket array
    /// could not be allocated. While non-zero the load factor may exceed
    /// [`MAX_LOAD_FACTOR`].
    pub fn failed_resizes(&self) -> u64 {
        self.failed_resizes
    }

    fn find(&self, key: i64) -> Option<EntryKey> {
        let mut cur = self.buckets[bucket_index(key, self.capacity())];
        while let Some(k) = cur {
            let e = self.slots.get(k)?;
            if e.key == key {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    pub fn get(&self, key: i64) -> Option<u32> {
        self.find(key)
            .and_then(|k| self.slots.get(k))
            .map(|e| e.value)
    }

    pub fn contains(&self, key: i64) -> bool {
        self.find(key).is_some()
    }

    /// Inserts or overwrites `key`.
    ///
    /// An existing entry is updated in place and keeps its chain position.
    /// A new entry is prepended to its chain, growing the bucket array to
    /// twice its size first if the insert would exceed [`MAX_LOAD_FACTOR`].
    pub fn put(&mut self, key: i64, value: u32) -> Result<Put, TableError> {
        if let Some(k) = self.find(key) {
            if let Some(e) = self.slots.get_mut(k) {
                let previous = std::mem::replace(&mut e.value, value);
                return Ok(Put::Updated { previous });
            }
        }

        if self.len() >= MAX_ENTRIES {
            return Err(TableError::EntryLimit {
                key,
                len: self.len(),
            });
        }

        if (self.len() + 1) as f64 / self.capacity() as f64 > MAX_LOAD_FACTOR {
            match self.capacity().checked_mul(2) {
                Some(new_capacity) => self.resize(new_capacity),
                None => self.note_failed_resize(usize::MAX),
            }
        }

        let idx = bucket_index(key, self.capacity());
        let head = self.buckets[idx];
        let k = self.slots.insert(Entry {
            key,
            value,
            next: head,
        });
        self.buckets[idx] = Some(k);
        Ok(Put::Inserted)
    }

    /// Unlinks and drops the entry for `key`. Returns whether it was present.
    pub fn remove(&mut self, key: i64) -> bool {
        let idx = bucket_index(key, self.capacity());
        let mut prev: Option<EntryKey> = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            let (entry_key, next) = match self.slots.get(k) {
                Some(e) => (e.key, e.next),
                None => return false,
            };
            if entry_key == key {
                match prev {
                    None => self.buckets[idx] = next,
                    Some(p) => {
                        if let Some(pe) = self.slots.get_mut(p) {
                            pe.next = next;
                        }
                    }
                }
                self.slots.remove(k);
                return true;
            }
            prev = cur;
            cur = next;
        }
        false
    }

    /// Drops every entry; capacity is unchanged.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.buckets.fill(None);
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            it: self.slots.iter(),
        }
    }

    // The new bucket array is fully built before it replaces the old one, so
    // an allocation failure leaves the table exactly as it was.
    fn resize(&mut self, new_capacity: usize) {
        let mut fresh = match alloc_buckets(new_capacity) {
            Ok(b) => b,
            Err(_) => return self.note_failed_resize(new_capacity),
        };

        for &head in &self.buckets {
            let mut cur = head;
            while let Some(k) = cur {
                let Some(e) = self.slots.get_mut(k) else {
                    break;
                };
                cur = e.next;
                let idx = bucket_index(e.key, new_capacity);
                e.next = fresh[idx];
                fresh[idx] = Some(k);
            }
        }

        tracing::debug!(
            from = self.capacity(),
            to = new_capacity,
            entries = self.len(),
            "hash table grown"
        );
        self.buckets = fresh;
    }

    fn note_failed_resize(&mut self, requested: usize) {
        self.failed_resizes += 1;
        tracing::warn!(
            capacity = self.capacity(),
            requested,
            entries = self.len(),
            "hash table resize failed, keeping old capacity"
        );
    }
}
