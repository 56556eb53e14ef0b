//! Entry pool
//!
//! Ordered, insertion-order collection of selectable entries. Colors are
//! assigned from the cyclic palette at insertion time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::palette_color;

/// Opaque unique identifier of an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A selectable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub label: String,
    /// Display color token (hex)
    pub color: String,
}

/// The live pool of entries
#[derive(Debug, Clone)]
pub struct EntryPool {
    entries: Vec<Entry>,
    /// Salt mixed into generated ids so ids differ between sessions
    id_salt: u32,
    /// Next id counter (never reset, so ids stay unique across `clear`)
    next_id: u64,
}

/// Pool preview handed to list views
#[derive(Debug, Serialize)]
struct PoolPreview<'a> {
    entries: &'a [Entry],
    hidden: usize,
}

impl Default for EntryPool {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EntryPool {
    /// Create an empty pool
    pub fn new(id_salt: u32) -> Self {
        Self {
            entries: Vec::new(),
            id_salt,
            next_id: 1,
        }
    }

    /// Compose a fresh pool from labels, coloring every entry by position
    pub fn from_labels<I, S>(id_salt: u32, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = Self::new(id_salt);
        for label in labels {
            pool.add(label.as_ref());
        }
        pool.recolor();
        pool
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(format!("e-{:08x}-{}", self.id_salt, self.next_id));
        self.next_id += 1;
        id
    }

    /// Add a single entry. Blank labels are dropped.
    ///
    /// Returns the new entry's id, or `None` if nothing was added.
    pub fn add(&mut self, label: &str) -> Option<EntryId> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let id = self.allocate_id();
        let color = palette_color(self.entries.len()).to_string();
        self.entries.push(Entry {
            id: id.clone(),
            label: label.to_string(),
            color,
        });
        Some(id)
    }

    /// Add one entry per non-blank line of `text`
    ///
    /// Returns the number of entries added.
    pub fn add_many(&mut self, text: &str) -> usize {
        text.lines().filter_map(|line| self.add(line)).count()
    }

    /// Remove an entry by id. Returns the removed entry, if it was present.
    pub fn remove(&mut self, id: &EntryId) -> Option<Entry> {
        let index = self.entries.iter().position(|e| &e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Recompute every color from its current position
    pub fn recolor(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.color = palette_color(index).to_string();
        }
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.get(id).is_some()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First `limit` entries for a list view, plus how many are hidden
    pub fn preview(&self, limit: usize) -> (&[Entry], usize) {
        let shown = self.entries.len().min(limit);
        (&self.entries[..shown], self.entries.len() - shown)
    }

    /// `preview` as `{"entries": [...], "hidden": n}`
    pub fn preview_json(&self, limit: usize) -> Result<String, serde_json::Error> {
        let (entries, hidden) = self.preview(limit);
        serde_json::to_string(&PoolPreview { entries, hidden })
    }
}
