use crate::ingest::columns::column_key;
use std::collections::HashMap;

/// Records finished earlier in a pass, looked up by identifier.
///
/// Identifiers compare case-insensitively; iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record; returns it back when the identifier is taken
    pub fn insert(&mut self, id: &str, value: T) -> Result<(), T> {
        let key = column_key(id);
        if self.index.contains_key(&key) {
            return Err(value);
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(value);
        Ok(())
    }

    /// Whether an identifier is registered
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(&column_key(id))
    }

    /// Record by identifier
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(&column_key(id)).map(|&i| &self.entries[i])
    }

    /// Mutable record by identifier
    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        match self.index.get(&column_key(id)) {
            Some(&i) => self.entries.get_mut(i),
            None => None,
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Consume the registry, yielding records in insertion order
    pub fn into_values(self) -> Vec<T> {
        self.entries
    }
}
