//! Row selection scoped to the current page

use std::collections::HashSet;
use std::sync::RwLock;

use crate::model::RowKey;
use crate::store::SharedStore;

/// Selected row keys.
pub type SelectionSet = HashSet<RowKey>;

/// What happens to stored keys that leave the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionRetention {
    /// Drop them whenever the page's key set changes.
    #[default]
    PruneToPage,
    /// Keep them; page keys only drive the page-local flags.
    Retain,
}

/// Tracks selected keys against the keys of the current page.
///
/// Every operation is a no-op while selection is disabled.
pub struct SelectionController {
    store: SharedStore<SelectionSet>,
    selectable: bool,
    retention: SelectionRetention,
    page_keys: RwLock<Option<Vec<RowKey>>>,
}

impl SelectionController {
    pub fn new(store: SharedStore<SelectionSet>, selectable: bool) -> Self {
        Self {
            store,
            selectable,
            retention: SelectionRetention::default(),
            page_keys: RwLock::new(None),
        }
    }

    pub fn with_retention(mut self, retention: SelectionRetention) -> Self {
        self.retention = retention;
        self
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn retention(&self) -> SelectionRetention {
        self.retention
    }

    /// The whole stored selection.
    pub fn current(&self) -> SelectionSet {
        self.store.get()
    }

    /// Keys of the current page, as last synced.
    pub fn page_keys(&self) -> Vec<RowKey> {
        self.page_keys
            .read()
            .ok()
            .and_then(|g| g.clone())
            .unwrap_or_default()
    }

    /// Records the keys now on the page and prunes the selection.
    ///
    /// Nothing happens when the keys equal the previously synced ones. Under
    /// [`SelectionRetention::PruneToPage`] the selection is intersected with
    /// `keys` and written back only if that removed something. Returns `true`
    /// when the key set changed.
    pub fn sync_page_keys(&self, keys: &[RowKey]) -> bool {
        if !self.selectable {
            return false;
        }
        {
            let Ok(mut guard) = self.page_keys.write() else {
                return false;
            };
            if guard.as_deref() == Some(keys) {
                return false;
            }
            *guard = Some(keys.to_vec());
        }

        if self.retention == SelectionRetention::PruneToPage {
            let current = self.store.get();
            let on_page: HashSet<&RowKey> = keys.iter().collect();
            let pruned: SelectionSet = current
                .iter()
                .filter(|k| on_page.contains(k))
                .cloned()
                .collect();
            if pruned.len() != current.len() {
                log::debug!(
                    "Pruned selection to page: {} -> {} keys",
                    current.len(),
                    pruned.len()
                );
                self.store.set(pruned);
            }
        }
        true
    }

    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selectable && self.store.get().contains(key)
    }

    /// Adds or removes one key.
    pub fn toggle(&self, key: RowKey) {
        if !self.selectable {
            return;
        }
        let mut next = self.store.get();
        if !next.remove(&key) {
            next.insert(key);
        }
        self.store.set(next);
    }

    /// Adds (`true`) or removes (`false`) every key on the page.
    pub fn select_all_on_page(&self, checked: bool) {
        if !self.selectable {
            return;
        }
        let keys = self.page_keys();
        let mut next = self.store.get();
        if checked {
            next.extend(keys);
        } else {
            for key in &keys {
                next.remove(key);
            }
        }
        self.store.set(next);
    }

    /// Removes every key on the page; keys elsewhere are untouched.
    pub fn clear_on_page(&self) {
        self.select_all_on_page(false);
    }

    /// Selected keys on the page, in page order.
    pub fn selected_on_page(&self) -> Vec<RowKey> {
        if !self.selectable {
            return Vec::new();
        }
        let current = self.store.get();
        self.page_keys()
            .into_iter()
            .filter(|k| current.contains(k))
            .collect()
    }

    /// Every key on a non-empty page is selected.
    pub fn all_selected_on_page(&self) -> bool {
        let keys = self.page_keys();
        if !self.selectable || keys.is_empty() {
            return false;
        }
        let current = self.store.get();
        keys.iter().all(|k| current.contains(k))
    }

    /// Some, but not all, keys on the page are selected.
    pub fn some_selected_on_page(&self) -> bool {
        let keys = self.page_keys();
        if !self.selectable || keys.is_empty() {
            return false;
        }
        let current = self.store.get();
        let selected = keys.iter().filter(|k| current.contains(k)).count();
        selected > 0 && selected < keys.len()
    }
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("selectable", &self.selectable)
            .field("retention", &self.retention)
            .field("selected", &self.store.get().len())
            .finish()
    }
}
