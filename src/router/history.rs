//! In-memory navigation history.

use super::location::Location;

/// Ordered history entries with a cursor, like a browser session history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry after the cursor, discarding any forward entries.
    pub fn push(&mut self, location: Location) {
        if self.entries.is_empty() {
            self.entries.push(location);
            self.index = 0;
            return;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    /// Overwrite the entry under the cursor (or add the first entry).
    pub fn replace(&mut self, location: Location) {
        match self.entries.get_mut(self.index) {
            Some(entry) => *entry = location,
            None => self.push(location),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Location> {
        self.entries.get(self.index)
    }

    /// The entry "back" would return to.
    #[must_use]
    pub fn previous(&self) -> Option<&Location> {
        self.index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full paths of every entry, oldest first.
    #[must_use]
    pub fn full_paths(&self) -> Vec<String> {
        self.entries.iter().map(Location::full_path).collect()
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
