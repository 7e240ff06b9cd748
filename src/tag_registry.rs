//! TagRegistry: stable integer tags for field names, backed by KeyTable.

use crate::key_table::{Iter, KeyTable, SetError};

/// Per-run registry assigning a monotonically increasing tag to every
/// distinct field name seen. Repeated names map to the same tag without
/// re-deriving it, so the same field carries the same tag across all
/// records of a run. Tags start at 1 and are dense in first-seen order.
pub struct TagRegistry {
    table: KeyTable<u32>,
    next_tag: u32,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            table: KeyTable::new(),
            next_tag: 1,
        }
    }

    /// Tag for `name`, assigning the next free tag on first sight.
    ///
    /// Fails with `SetError::CapacityOverflow` once the tag space is
    /// exhausted; like table growth overflow, no later assignment could
    /// succeed either.
    pub fn tag_for(&mut self, name: &str) -> Result<u32, SetError> {
        if let Some(&tag) = self.table.get(name) {
            return Ok(tag);
        }
        let tag = self.next_tag;
        let bumped = tag.checked_add(1).ok_or(SetError::CapacityOverflow)?;
        self.table.set(name, tag)?;
        self.next_tag = bumped;
        Ok(tag)
    }

    /// Tag for `name` if it has been seen, without assigning one.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.table.get(name).copied()
    }

    /// Number of distinct names registered.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate over `(name, tag)` pairs in unspecified order.
    pub fn iter(&self) -> Iter<'_, u32> {
        self.table.iter()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}
