//! Controlled and uncontrolled state ownership.
//!
//! Every piece of table state (search query, column filters, sort, page,
//! selection) is read and written through a [`StateStore`]. Which
//! implementation backs it is decided once, when the table is built:
//!
//! - [`InternalStore`] owns the value, seeded from an optional initial value.
//! - [`ControlledStore`] reads the caller's current value and forwards
//!   writes to the caller's change callback. Without a callback, writes are
//!   silently dropped so the caller can render read-only state.

use std::sync::{Arc, RwLock};

/// Uniform read/write access to one piece of table state.
pub trait StateStore<V>: Send + Sync {
    /// Returns the current value.
    fn get(&self) -> V;

    /// Requests a new value.
    fn set(&self, next: V);

    /// Returns `true` when the caller owns the value.
    fn is_controlled(&self) -> bool;
}

/// Shared handle to a state store.
pub type SharedStore<V> = Arc<dyn StateStore<V>>;

/// State owned by the engine.
///
/// Cheap to clone; clones share the same value.
#[derive(Debug)]
pub struct InternalStore<V> {
    inner: Arc<RwLock<V>>,
}

impl<V> InternalStore<V> {
    /// Creates a store seeded with the given value.
    pub fn new(value: V) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Updates the value in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut V),
    {
        if let Ok(mut guard) = self.inner.write() {
            f(&mut guard);
        }
    }
}

impl<V: Clone + Send + Sync> StateStore<V> for InternalStore<V> {
    fn get(&self) -> V {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn set(&self, next: V) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = next;
        }
    }

    fn is_controlled(&self) -> bool {
        false
    }
}

impl<V> Clone for InternalStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Default> Default for InternalStore<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

/// Reads the caller's current value.
pub type Getter<V> = Arc<dyn Fn() -> V + Send + Sync>;

/// Receives a requested value.
pub type ChangeCallback<V> = Arc<dyn Fn(V) + Send + Sync>;

/// State owned by the caller.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, RwLock};
/// use datatable_lib::store::{ControlledStore, StateStore};
///
/// let page = Arc::new(RwLock::new(3usize));
/// let read = Arc::clone(&page);
/// let write = Arc::clone(&page);
/// let store = ControlledStore::new(move || *read.read().unwrap())
///     .with_on_change(move |next| *write.write().unwrap() = next);
///
/// store.set(4);
/// assert_eq!(store.get(), 4);
/// ```
pub struct ControlledStore<V> {
    read: Getter<V>,
    on_change: Option<ChangeCallback<V>>,
}

impl<V> ControlledStore<V> {
    /// Creates a controlled store from a getter, without a change callback.
    pub fn new<F>(read: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        Self {
            read: Arc::new(read),
            on_change: None,
        }
    }

    /// Creates a read-only controlled store pinned to a value.
    pub fn fixed(value: V) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        Self::new(move || value.clone())
    }

    /// Sets the change callback.
    pub fn with_on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Returns `true` if a change callback is installed.
    pub fn has_on_change(&self) -> bool {
        self.on_change.is_some()
    }
}

impl<V> StateStore<V> for ControlledStore<V> {
    fn get(&self) -> V {
        (self.read)()
    }

    fn set(&self, next: V) {
        if let Some(on_change) = &self.on_change {
            on_change(next);
        }
    }

    fn is_controlled(&self) -> bool {
        true
    }
}

impl<V> Clone for ControlledStore<V> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
            on_change: self.on_change.clone(),
        }
    }
}

impl<V> std::fmt::Debug for ControlledStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlledStore")
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

/// How a piece of state is owned, chosen at construction time.
pub enum Ownership<V> {
    /// Engine-owned, seeded with an initial value.
    Uncontrolled(V),
    /// Caller-owned.
    Controlled(ControlledStore<V>),
}

impl<V: Clone + Send + Sync + 'static> Ownership<V> {
    /// Builds the backing store.
    pub fn into_store(self) -> SharedStore<V> {
        match self {
            Ownership::Uncontrolled(initial) => Arc::new(InternalStore::new(initial)),
            Ownership::Controlled(store) => Arc::new(store),
        }
    }
}

impl<V: Default> Default for Ownership<V> {
    fn default() -> Self {
        Ownership::Uncontrolled(V::default())
    }
}
