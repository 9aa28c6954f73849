use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::PageNumber;

/// Raw listing markup keyed by page number. Only markup that parsed into at
/// least one entry is stored.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: Mutex<HashMap<PageNumber, String>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: PageNumber) -> Option<String> {
        self.lock().get(&page).cloned()
    }

    pub fn put(&self, page: PageNumber, markup: String) {
        self.lock().insert(page, markup);
    }

    pub fn invalidate(&self, page: PageNumber) -> bool {
        self.lock().remove(&page).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn contains(&self, page: PageNumber) -> bool {
        self.lock().contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PageNumber, String>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
