// ── List selection ──
//
// Tracks which rows of the current result list are marked and notifies a
// single observer whenever that set changes.

use std::collections::BTreeSet;

/// Observer invoked with the selected items, in list order.
pub type SelectionListener<T> = Box<dyn FnMut(&[T]) + Send>;

pub struct SelectionModel<T> {
    items: Vec<T>,
    marked: BTreeSet<usize>,
    listener: Option<SelectionListener<T>>,
}

impl<T> Default for SelectionModel<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            marked: BTreeSet::new(),
            listener: None,
        }
    }
}

impl<T: Clone> SelectionModel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the observer, replacing any previous one.
    pub fn on_change(&mut self, listener: impl FnMut(&[T]) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Replace the rows. Any selection is dropped.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if !self.marked.is_empty() {
            self.marked.clear();
            self.notify();
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.marked.len()
    }

    /// Flip one row. Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        if !self.marked.remove(&index) {
            self.marked.insert(index);
        }
        self.notify();
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        let before = self.marked.len();
        if selected {
            self.marked = (0..self.items.len()).collect();
        } else {
            self.marked.clear();
        }
        if self.marked.len() != before {
            self.notify();
        }
    }

    pub fn selected(&self) -> Vec<T> {
        self.marked
            .iter()
            .filter_map(|&i| self.items.get(i).cloned())
            .collect()
    }

    fn notify(&mut self) {
        let selected = self.selected();
        if let Some(listener) = self.listener.as_mut() {
            listener(&selected);
        }
    }
}
