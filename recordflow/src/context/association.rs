//! Identity-keyed weak side-table.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Live-entry count below which attach never sweeps.
const SWEEP_FLOOR: usize = 64;

struct Association<T, V> {
    owner: Weak<T>,
    value: V,
}

/// A thread-safe table associating a value with an `Arc` allocation.
///
/// Entries are keyed by the allocation's address, so two equal values in
/// different allocations never share an entry. The table only holds a
/// [`Weak`] to the owner: attaching never keeps the owner alive. While an
/// entry exists its weak pointer keeps the allocation itself reserved, so
/// the address cannot be reused by another owner until the entry is gone.
///
/// Entries whose owner has been dropped are removed by [`release`],
/// [`purge`], or the amortized sweep that runs when the table doubles in
/// size.
///
/// [`release`]: AssociationTable::release
/// [`purge`]: AssociationTable::purge
pub struct AssociationTable<T, V> {
    entries: DashMap<usize, Association<T, V>>,
    sweep_at: AtomicUsize,
}

impl<T, V> AssociationTable<T, V> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            sweep_at: AtomicUsize::new(SWEEP_FLOOR),
        }
    }

    fn key(owner: &Arc<T>) -> usize {
        Arc::as_ptr(owner).cast::<()>() as usize
    }

    /// Associates `value` with `owner`, replacing any previous value.
    pub fn attach(&self, owner: &Arc<T>, value: V) {
        self.entries.insert(
            Self::key(owner),
            Association {
                owner: Arc::downgrade(owner),
                value,
            },
        );

        if self.entries.len() >= self.sweep_at.load(Ordering::Relaxed) {
            let removed = self.purge();
            let next = (self.entries.len() * 2).max(SWEEP_FLOOR);
            self.sweep_at.store(next, Ordering::Relaxed);
            tracing::trace!(removed, next_sweep_at = next, "Swept association table");
        }
    }

    /// Returns the value associated with `owner`, if any.
    #[must_use]
    pub fn try_get(&self, owner: &Arc<T>) -> Option<V>
    where
        V: Clone,
    {
        self.entries.get(&Self::key(owner)).map(|entry| {
            debug_assert!(std::ptr::eq(entry.owner.as_ptr(), Arc::as_ptr(owner)));
            entry.value.clone()
        })
    }

    /// Checks whether `owner` has an associated value.
    #[must_use]
    pub fn has(&self, owner: &Arc<T>) -> bool {
        self.entries.contains_key(&Self::key(owner))
    }

    /// Removes and returns the value associated with `owner`.
    pub fn release(&self, owner: &Arc<T>) -> Option<V> {
        self.entries.remove(&Self::key(owner)).map(|(_, entry)| entry.value)
    }

    /// Drops every entry whose owner no longer exists. Returns how many
    /// entries were removed.
    pub fn purge(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.owner.strong_count() > 0);
        before.saturating_sub(self.entries.len())
    }

    /// Returns the number of entries whose owner is still alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.owner.strong_count() > 0)
            .count()
    }

    /// Returns true if no live entries remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, V> Default for AssociationTable<T, V> {
    fn default() -> Self {
        Self::new()
    }
}
