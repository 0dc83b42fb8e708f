//! Last-inputs/last-output cache cell

use std::sync::Mutex;

/// Holds the most recent `(key, value)` pair.
///
/// A lookup with a key equal to the stored one returns the stored value
/// without recomputing. Any other key recomputes and replaces it.
#[derive(Debug)]
pub struct MemoCell<K, V> {
    slot: Mutex<Option<(K, V)>>,
}

impl<K: PartialEq, V: Clone> MemoCell<K, V> {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached value for `key`, computing and storing it if needed.
    ///
    /// The computation runs outside the lock. Errors are returned without
    /// touching the cached entry.
    pub fn get_or_try_insert<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Ok(slot) = self.slot.lock() {
            if let Some((cached_key, cached)) = slot.as_ref() {
                if *cached_key == key {
                    return Ok(cached.clone());
                }
            }
        }

        let value = compute()?;
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some((key, value.clone()));
        }
        Ok(value)
    }

    /// Drops the cached entry.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl<K: PartialEq, V: Clone> Default for MemoCell<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
